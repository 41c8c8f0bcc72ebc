//! Simulation time: frame clock, pausable timers and one-shot latches.
//!
//! Nothing here reads the wall clock. Every counter moves only when the
//! frame driver hands the core a timestep.

/// Clamp a raw frame delta into something the simulation can integrate.
/// Non-finite or negative deltas become zero.
pub fn sanitize_dt(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt.max(0.0))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimClock {
    pub elapsed: f64,
    pub frame: u64,
}

impl SimClock {
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt as f64;
        self.frame += 1;
    }
}

/// A named scene timer: counts up while running, frozen while paused.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimTimer {
    elapsed: f32,
    paused: bool,
}

impl SimTimer {
    pub fn new() -> Self {
        SimTimer::default()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Back to zero and running.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.paused {
            self.elapsed += dt;
        }
    }
}

/// Fires once on the rising edge of a condition and re-arms as soon as the
/// condition is observed false.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OnceLatch {
    fired: bool,
}

impl OnceLatch {
    pub fn trigger(&mut self, condition: bool) -> bool {
        if !condition {
            self.fired = false;
            return false;
        }
        if self.fired {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}

/// Every one-shot trigger a session uses, by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Latches {
    /// Jump input edge: holding the key jumps once.
    pub jump_input: OnceLatch,
    /// Jump cue: one sound per ascent.
    pub jump_cue: OnceLatch,
    /// Restart prompt shown once after death.
    pub restart_prompt: OnceLatch,
}

impl Latches {
    pub fn reset(&mut self) {
        self.jump_input.reset();
        self.jump_cue.reset();
        self.restart_prompt.reset();
    }
}
