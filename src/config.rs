//! Tunables for the simulation, loadable from a RON file.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the
//! fields it wants to change.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::entities::Size;
use crate::error::ConfigError;

/// Shortest spawn interval a config may ask for, in seconds.
pub const MIN_SPAWN_INTERVAL: f32 = 0.05;
/// Most extra hazards a single wave may be granted.
pub const MAX_BUDGET_EXTRA: f32 = 16.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub spawn: SpawnConfig,
    pub score: ScoreConfig,
    pub sprites: SpriteConfig,
    pub session: SessionConfig,
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    /// Defaults when `path` is `None` or does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => GameConfig::load(p),
            _ => Ok(GameConfig::default()),
        }
    }

    pub fn sanitized(&self) -> Self {
        GameConfig {
            spawn: self.spawn.sanitized(),
            ..self.clone()
        }
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub view_width: f32,
    pub view_height: f32,
    /// Top edge of the ground tiles; the player's feet rest here.
    pub ground_y: f32,
    pub tile_width: f32,
    pub tile_height: f32,
    /// Extra distance behind the player before an entity is pruned.
    pub prune_margin: f32,
    /// Where the player sits horizontally on screen.
    pub player_screen_x: f32,
    /// Longest timestep integrated in a single tick.
    pub max_frame_dt: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            view_width: 1280.0,
            view_height: 720.0,
            ground_y: 496.0,
            tile_width: 1280.0,
            tile_height: 224.0,
            prune_margin: 100.0,
            player_screen_x: 200.0,
            max_frame_dt: 0.1,
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start_x: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub max_fall_speed: f32,
    pub acceleration: f32,
    pub initial_max_speed: f32,
    /// Max-speed gain per second of play.
    pub speed_ramp: f32,
    /// The ramp only applies while max speed is below this value.
    /// `None` lets it rise for the whole run.
    pub speed_checkpoint: Option<f32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            start_x: 200.0,
            gravity: 1000.0,
            jump_speed: 600.0,
            max_fall_speed: 700.0,
            acceleration: 1500.0,
            initial_max_speed: 250.0,
            speed_ramp: 6.0,
            speed_checkpoint: Some(800.0),
        }
    }
}

// ── Spawner ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub interval_start: f32,
    pub interval_floor: f32,
    /// The interval shrinks by `dt / interval_decay_divisor` each tick.
    pub interval_decay_divisor: f32,
    pub jitter_min: f32,
    pub jitter_max: f32,
    /// Distance ahead of the player where new objects appear.
    pub lookahead: f32,
    pub offset_min: i32,
    pub offset_max: i32,
    /// Height of a road's top edge above the ground.
    pub road_lift: f32,
    /// Horizontal gap between hazards of the same wave.
    pub wave_spacing: f32,
    /// Score per extra hazard allowed in a wave.
    pub budget_score_step: f32,
    pub budget_max_extra: f32,
    /// Leftward drift given to new hazards; zero means none.
    pub hazard_drift: f32,
    pub poison_target: f32,
    pub road_target: f32,
    pub pine_target: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        SpawnConfig {
            interval_start: 2.0,
            interval_floor: 0.7,
            interval_decay_divisor: 30.0,
            jitter_min: 0.8,
            jitter_max: 1.2,
            lookahead: 960.0,
            offset_min: 75,
            offset_max: 125,
            road_lift: 150.0,
            wave_spacing: 160.0,
            budget_score_step: 3000.0,
            budget_max_extra: 4.0,
            hazard_drift: 0.0,
            poison_target: 100.0,
            road_target: 125.0,
            pine_target: 60.0,
        }
    }
}

impl SpawnConfig {
    /// Repair ranges that would make the spawner misbehave. Bad values are
    /// clamped and logged rather than rejected.
    pub fn sanitized(&self) -> Self {
        let defaults = SpawnConfig::default();
        let mut s = self.clone();

        if !(s.interval_floor.is_finite() && s.interval_floor >= MIN_SPAWN_INTERVAL) {
            warn!(
                "spawn.interval_floor {} is too small, using {}",
                s.interval_floor, MIN_SPAWN_INTERVAL
            );
            s.interval_floor = MIN_SPAWN_INTERVAL;
        }
        if !s.interval_start.is_finite() || s.interval_start < s.interval_floor {
            warn!(
                "spawn.interval_start {} is below the floor, clamping to {}",
                s.interval_start, s.interval_floor
            );
            s.interval_start = s.interval_floor;
        }
        if !(s.interval_decay_divisor.is_finite() && s.interval_decay_divisor > 0.0) {
            warn!(
                "spawn.interval_decay_divisor {} must be positive, using {}",
                s.interval_decay_divisor, defaults.interval_decay_divisor
            );
            s.interval_decay_divisor = defaults.interval_decay_divisor;
        }
        if s.jitter_min > s.jitter_max {
            warn!("spawn jitter range is reversed, swapping");
            std::mem::swap(&mut s.jitter_min, &mut s.jitter_max);
        }
        if !(s.jitter_min.is_finite() && s.jitter_min > 0.0) {
            warn!("spawn.jitter_min {} must be positive, using 0.01", s.jitter_min);
            s.jitter_min = 0.01;
        }
        if !s.jitter_max.is_finite() || s.jitter_max < s.jitter_min {
            s.jitter_max = s.jitter_min;
        }
        if s.offset_min > s.offset_max {
            warn!("spawn offset range is reversed, swapping");
            std::mem::swap(&mut s.offset_min, &mut s.offset_max);
        }
        if !(s.budget_score_step.is_finite() && s.budget_score_step > 0.0) {
            warn!(
                "spawn.budget_score_step {} must be positive, using {}",
                s.budget_score_step, defaults.budget_score_step
            );
            s.budget_score_step = defaults.budget_score_step;
        }
        if !(s.budget_max_extra.is_finite() && s.budget_max_extra >= 0.0) {
            warn!("spawn.budget_max_extra {} is invalid, using 0", s.budget_max_extra);
            s.budget_max_extra = 0.0;
        }
        if s.budget_max_extra > MAX_BUDGET_EXTRA {
            warn!(
                "spawn.budget_max_extra {} is too large, capping at {}",
                s.budget_max_extra, MAX_BUDGET_EXTRA
            );
            s.budget_max_extra = MAX_BUDGET_EXTRA;
        }
        if !s.wave_spacing.is_finite() || s.wave_spacing < 0.0 {
            s.wave_spacing = 0.0;
        }
        s
    }
}

// ── Score ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub points_per_second: f64,
    pub bonus_points: u64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        ScoreConfig {
            points_per_second: 100.0,
            bonus_points: 500,
        }
    }
}

// ── Sprites ───────────────────────────────────────────────────────────────────

/// Source asset dimensions, before any scale correction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    pub player: Size,
    pub poison: Size,
    pub road: Size,
    pub pine: Size,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        SpriteConfig {
            player: Size::new(64.0, 48.0),
            poison: Size::new(128.0, 128.0),
            road: Size::new(256.0, 64.0),
            pine: Size::new(96.0, 128.0),
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds of `Dead` before restart input is accepted.
    pub restart_delay: f32,
    /// Use touch wording for the tutorial prompts.
    pub touch_prompts: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            restart_delay: 0.5,
            touch_prompts: false,
        }
    }
}
