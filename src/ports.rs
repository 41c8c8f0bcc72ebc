//! Contracts for the collaborators that drive the core or hear from it.

use crate::entities::InputFrame;

/// Polled once per tick by the runner.
pub trait InputSource {
    fn is_jump_requested(&self) -> bool;
    fn is_any_key_released(&self) -> bool;
    fn is_primary_pointer_pressed(&self) -> bool;

    fn sample(&self) -> InputFrame {
        InputFrame {
            jump_requested: self.is_jump_requested(),
            any_key_released: self.is_any_key_released(),
            pointer_pressed: self.is_primary_pointer_pressed(),
        }
    }
}

impl InputSource for InputFrame {
    fn is_jump_requested(&self) -> bool {
        self.jump_requested
    }

    fn is_any_key_released(&self) -> bool {
        self.any_key_released
    }

    fn is_primary_pointer_pressed(&self) -> bool {
        self.pointer_pressed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Jump,
    Bonus,
    Death,
}

impl Cue {
    pub fn id(self) -> &'static str {
        match self {
            Cue::Jump => "jump",
            Cue::Bonus => "bonus",
            Cue::Death => "death",
        }
    }
}

/// Fire-and-forget sound output. Implementations swallow their own errors.
pub trait AudioPlayer {
    fn play(&mut self, cue: Cue);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioPlayer for SilentAudio {
    fn play(&mut self, _cue: Cue) {}
}
