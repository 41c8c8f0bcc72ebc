//! Player integration and world motion.
//!
//! All functions are infallible: they assume a sanitized `dt` and clamp
//! whatever else could push the state out of range.

use crate::config::{PlayerConfig, WorldConfig};
use crate::entities::{EntityKind, JumpState, Player, Rect, Size, Vec2};
use crate::world::EntityStore;

/// Backdrop scrolls at a quarter of the camera speed.
pub const PARALLAX_DIVISOR: f32 = 4.0;

/// Slack when deciding whether the player came from above a platform.
const LANDING_EPSILON: f32 = 0.5;

// ── Player ────────────────────────────────────────────────────────────────────

pub fn spawn_player(player_cfg: &PlayerConfig, world: &WorldConfig, sprite: Size) -> Player {
    Player {
        pos: Vec2::new(player_cfg.start_x, world.ground_y - sprite.height),
        base_size: sprite,
        scale: 1.0,
        velocity: Vec2::ZERO,
        max_speed: player_cfg.initial_max_speed,
        jump: JumpState::Grounded,
        controls_enabled: false,
    }
}

/// Raise the running-speed ceiling. The checkpoint is tested before the
/// increment, so the step that crosses it is still applied.
pub fn ramp_max_speed(player: &mut Player, dt: f32, cfg: &PlayerConfig) {
    let below_checkpoint = cfg
        .speed_checkpoint
        .map_or(true, |limit| player.max_speed < limit);
    if below_checkpoint {
        player.max_speed += dt * cfg.speed_ramp;
    }
}

/// Start a jump if the player is standing and allowed to act.
pub fn request_jump(player: &mut Player, cfg: &PlayerConfig) -> bool {
    if !player.controls_enabled || !player.is_grounded() {
        return false;
    }
    player.velocity.y = -cfg.jump_speed;
    player.jump = JumpState::Jumping;
    true
}

/// Cancel the upward part of a jump; the player simply falls from here.
pub fn abort_jump(player: &mut Player) {
    if player.velocity.y < 0.0 {
        player.velocity.y = 0.0;
    }
}

/// Accelerate toward max speed and advance along the track.
pub fn run_forward(player: &mut Player, dt: f32, cfg: &PlayerConfig) {
    let target = player.max_speed.max(0.0);
    player.velocity.x = (player.velocity.x + cfg.acceleration * dt).min(target);
    player.pos.x += player.velocity.x * dt;
}

/// Apply gravity and resolve landings on the ground line and on top of
/// `platforms`. Returns `true` when the player touched down this tick.
pub fn integrate_player(
    player: &mut Player,
    platforms: &[Rect],
    dt: f32,
    cfg: &PlayerConfig,
    ground_y: f32,
) -> bool {
    let height = player.size().height;
    let prev_bottom = player.pos.y + height;

    player.velocity.y = (player.velocity.y + cfg.gravity * dt).min(cfg.max_fall_speed);
    player.pos.y += player.velocity.y * dt;

    let body = player.rect();
    let mut support = ground_y;
    if player.velocity.y >= 0.0 {
        for p in platforms {
            let overlaps_x = body.x <= p.right() && p.x <= body.right();
            let came_from_above = prev_bottom <= p.y + LANDING_EPSILON;
            if overlaps_x && came_from_above && body.bottom() >= p.y && p.y < support {
                support = p.y;
            }
        }
    }

    if player.pos.y + height >= support {
        player.pos.y = support - height;
        player.velocity.y = 0.0;
        let landed = player.jump == JumpState::Jumping;
        player.jump = JumpState::Grounded;
        landed
    } else {
        player.jump = JumpState::Jumping;
        false
    }
}

pub fn camera_x(player: &Player, world: &WorldConfig) -> f32 {
    player.pos.x - world.player_screen_x
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Move every entity that still carries a force.
pub fn drift_entities(store: &mut EntityStore, kinds: &[EntityKind], dt: f32) {
    for &kind in kinds {
        for e in store.query_mut(kind) {
            if let Some(v) = e.velocity {
                e.pos.x += v.x * dt;
                e.pos.y += v.y * dt;
            }
        }
    }
}

pub fn clear_forces(store: &mut EntityStore, kinds: &[EntityKind]) {
    for &kind in kinds {
        for e in store.query_mut(kind) {
            e.velocity = None;
        }
    }
}

/// Keep at least two ground tiles by appending after the rightmost one.
/// With no tiles left the first one starts at `from_x`. Returns how many
/// tiles were added.
pub fn extend_ground(store: &mut EntityStore, world: &WorldConfig, from_x: f32) -> usize {
    let mut added = 0;
    while store.count(EntityKind::WoodBackground) < 2 {
        let (x, y) = store
            .query(EntityKind::WoodBackground)
            .iter()
            .map(|t| (t.pos.x + t.size().width, t.pos.y))
            .fold(None, |best: Option<(f32, f32)>, cur| match best {
                Some(b) if b.0 >= cur.0 => Some(b),
                _ => Some(cur),
            })
            .unwrap_or((from_x, world.ground_y));
        store.spawn(
            EntityKind::WoodBackground,
            Vec2::new(x, y),
            Size::new(world.tile_width, world.tile_height),
        );
        added += 1;
    }
    added
}

/// Pin the backdrop to the camera and scroll its texture.
pub fn update_parallax(store: &mut EntityStore, camera_x: f32) {
    for bg in store.query_mut(EntityKind::ForestBackground) {
        bg.pos.x = camera_x;
        bg.texture_offset = camera_x / PARALLAX_DIVISOR;
    }
}

/// Drop entities that fell behind the player. Returns the number removed.
pub fn prune_behind(
    store: &mut EntityStore,
    kinds: &[EntityKind],
    player_x: f32,
    margin: f32,
) -> usize {
    kinds
        .iter()
        .map(|&kind| store.retain(kind, |e| e.pos.x >= player_x - e.size().width - margin))
        .sum()
}
