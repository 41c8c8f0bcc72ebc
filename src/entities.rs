//! All game entity types. Pure data, no game rules.
//!
//! Coordinates are world pixels with the origin at the top-left and `y`
//! growing downward, so "up" is negative `y`.

use serde::{Deserialize, Serialize};

use crate::clock::{Latches, SimClock};
use crate::spawner::SpawnState;
use crate::world::EntityStore;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Size { width, height }
    }

    pub fn scaled(self, scale: f32) -> Size {
        Size {
            width: self.width * scale,
            height: self.height * scale,
        }
    }
}

/// Axis-aligned box, top-left anchored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn from_parts(pos: Vec2, size: Size) -> Self {
        Rect::new(pos.x, pos.y, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

// ── Kinds ─────────────────────────────────────────────────────────────────────

/// Every object type the scene knows about. The store is keyed by this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    /// Hazard.
    Poison,
    /// Reward.
    Pine,
    /// Floating lane tile that may carry a reward.
    Road,
    /// Ground tiles laid end to end.
    WoodBackground,
    /// Parallax backdrop.
    ForestBackground,
    ScoreText,
    HighScoreText,
    TutorialText,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Player,
    Hazard,
    Reward,
    Ground,
    Scenery,
    Text,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Player,
        EntityKind::Poison,
        EntityKind::Pine,
        EntityKind::Road,
        EntityKind::WoodBackground,
        EntityKind::ForestBackground,
        EntityKind::ScoreText,
        EntityKind::HighScoreText,
        EntityKind::TutorialText,
    ];

    pub fn role(self) -> Role {
        match self {
            EntityKind::Player => Role::Player,
            EntityKind::Poison => Role::Hazard,
            EntityKind::Pine => Role::Reward,
            EntityKind::Road => Role::Ground,
            EntityKind::WoodBackground | EntityKind::ForestBackground => Role::Scenery,
            EntityKind::ScoreText | EntityKind::HighScoreText | EntityKind::TutorialText => {
                Role::Text
            }
        }
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Size of the source asset before scaling.
    pub base_size: Size,
    pub scale: f32,
    /// Road sub-variant deciding where its reward sits.
    pub lane: Option<u8>,
    /// Residual force applied every tick; cleared on death.
    pub velocity: Option<Vec2>,
    pub text: Option<String>,
    pub visible: bool,
    /// Horizontal texture scroll, used by the parallax backdrop.
    pub texture_offset: f32,
}

impl Entity {
    pub fn size(&self) -> Size {
        self.base_size.scaled(self.scale)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.pos, self.size())
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpState {
    Grounded,
    Jumping,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub base_size: Size,
    pub scale: f32,
    /// `x` is the running speed, `y` the vertical speed (negative = rising).
    pub velocity: Vec2,
    /// Ceiling for the running speed; rises over a run.
    pub max_speed: f32,
    pub jump: JumpState,
    /// Whether the jump/run behaviour reacts to input.
    pub controls_enabled: bool,
}

impl Player {
    pub fn size(&self) -> Size {
        self.base_size.scaled(self.scale)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.pos, self.size())
    }

    pub fn is_grounded(&self) -> bool {
        self.jump == JumpState::Grounded
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Preparing,
    Playing,
    Dead,
}

/// Input sampled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub jump_requested: bool,
    pub any_key_released: bool,
    pub pointer_pressed: bool,
}

/// Things that happened during one tick, drained by whoever drives the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Jumped,
    BonusCollected { points: u64 },
    Died { score: u64 },
    HighScoreBeaten(u64),
    Restarted,
}

/// The entire per-run state. Cloneable so the update functions in
/// `compute` can return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub status: GameStatus,
    pub player: Player,
    pub store: EntityStore,
    pub spawn: SpawnState,
    pub latches: Latches,
    pub clock: SimClock,
    /// Seconds spent in `Playing` during this run.
    pub run_time: f64,
    /// Seconds spent in `Dead`; gates the restart input.
    pub dead_time: f32,
    pub bonus_points: u64,
    pub score: u64,
    /// `None` until a run or the store provides one.
    pub high_score: Option<u64>,
    pub camera_x: f32,
    /// Events emitted by the most recent tick only.
    pub events: Vec<GameEvent>,
}
