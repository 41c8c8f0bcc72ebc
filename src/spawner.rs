//! Timed, randomized creation of hazards, roads and rewards.
//!
//! A spawn cycle fires whenever the spawn timer reaches the current
//! threshold. Each cycle rolls one of three variants:
//!
//! * `Hazard`: a single poison ahead of the player;
//! * `Road`: a floating road whose lane decides where a pine goes;
//! * `Wave`: re-rolls the hazard budget from the score and fills it.
//!
//! All randomness comes through the `rng` argument so callers control
//! determinism (tests use a seeded `StdRng`).

use log::debug;
use rand::Rng;

use crate::clock::SimTimer;
use crate::config::{GameConfig, SpawnConfig};
use crate::entities::{Entity, EntityId, EntityKind, Size, Vec2};
use crate::world::EntityStore;

// ── State ─────────────────────────────────────────────────────────────────────

/// How many hazards a wave may place, and how many it has placed so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HazardBudget {
    pub allowed: u32,
    pub spawned: u32,
}

impl HazardBudget {
    /// Claim one more hazard slot. Once the budget is met the counter goes
    /// back to zero and this returns `false`.
    pub fn next(&mut self) -> bool {
        if self.spawned < self.allowed {
            self.spawned += 1;
            true
        } else {
            self.spawned = 0;
            false
        }
    }

    /// `1 ..= 1 + round(clamp(score / step, 0, max_extra))`.
    pub fn reroll(&mut self, score: u64, cfg: &SpawnConfig, rng: &mut impl Rng) {
        let extra = (score as f32 / cfg.budget_score_step)
            .min(cfg.budget_max_extra)
            .max(0.0)
            .round() as i32;
        self.allowed = random_in_range(rng, 1, 1i32.saturating_add(extra)) as u32;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnState {
    pub timer: SimTimer,
    /// Base time between cycles; shrinks during a run.
    pub interval: f32,
    /// Timer value that triggers the next cycle.
    pub threshold: f32,
    pub budget: HazardBudget,
    pub last_variant: Option<SpawnVariant>,
}

impl SpawnState {
    pub fn new(cfg: &SpawnConfig) -> Self {
        SpawnState {
            timer: SimTimer::new(),
            interval: cfg.interval_start,
            threshold: cfg.interval_start,
            budget: HazardBudget::default(),
            last_variant: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnVariant {
    Hazard,
    Road,
    Wave,
}

impl SpawnVariant {
    pub fn from_roll(roll: i32) -> Self {
        match roll {
            0 => SpawnVariant::Hazard,
            1 => SpawnVariant::Road,
            _ => SpawnVariant::Wave,
        }
    }
}

/// Where the spawner looks when placing things.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnContext {
    pub player_x: f32,
    pub ground_y: f32,
    pub score: u64,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Inclusive integer range; a reversed range is swapped instead of panicking.
pub fn random_in_range(rng: &mut impl Rng, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(lo..=hi)
}

/// New scale so that the larger side of the sprite equals `target`.
/// Degenerate sizes keep the current scale.
pub fn fit_scale(scale: f32, base: Size, target: f32) -> f32 {
    let current = base.scaled(scale);
    let longest = current.width.max(current.height);
    if longest <= 0.0 || !longest.is_finite() || target <= 0.0 {
        return scale;
    }
    scale * (target / longest)
}

pub fn roll_threshold(interval: f32, cfg: &SpawnConfig, rng: &mut impl Rng) -> f32 {
    let jitter = if cfg.jitter_min < cfg.jitter_max {
        rng.gen_range(cfg.jitter_min..=cfg.jitter_max)
    } else {
        cfg.jitter_min
    };
    (interval * jitter).max(0.0)
}

fn ahead_x(ctx: &SpawnContext, cfg: &SpawnConfig, rng: &mut impl Rng) -> f32 {
    ctx.player_x + cfg.lookahead + random_in_range(rng, cfg.offset_min, cfg.offset_max) as f32
}

/// Anchor for a road's reward: lane 0 sits on top of the road, lane 1
/// hangs under it, any other lane carries nothing.
pub fn reward_anchor(road: &Entity, lane: u8, reward: Size) -> Option<Vec2> {
    let rect = road.rect();
    let x = rect.center_x() - reward.width / 2.0;
    match lane {
        0 => Some(Vec2::new(x, rect.y - reward.height)),
        1 => Some(Vec2::new(x, rect.bottom())),
        _ => None,
    }
}

// ── Placement ─────────────────────────────────────────────────────────────────

/// Poison resting on the ground at `x`.
pub fn spawn_hazard(store: &mut EntityStore, x: f32, ground_y: f32, cfg: &GameConfig) -> EntityId {
    let base = cfg.sprites.poison;
    let scale = fit_scale(1.0, base, cfg.spawn.poison_target);
    let drift = cfg.spawn.hazard_drift;
    let e = store.spawn(EntityKind::Poison, Vec2::new(x, 0.0), base);
    e.scale = scale;
    e.pos.y = ground_y - e.size().height;
    if drift != 0.0 {
        e.velocity = Some(Vec2::new(-drift, 0.0));
    }
    e.id
}

/// Road at `x` plus the reward its lane calls for.
pub fn spawn_road(
    store: &mut EntityStore,
    x: f32,
    ground_y: f32,
    lane: u8,
    cfg: &GameConfig,
) -> (EntityId, Option<EntityId>) {
    let base = cfg.sprites.road;
    let road = store.spawn(
        EntityKind::Road,
        Vec2::new(x, ground_y - cfg.spawn.road_lift),
        base,
    );
    road.scale = fit_scale(1.0, base, cfg.spawn.road_target);
    road.lane = Some(lane);
    let road = road.clone();

    let pine_base = cfg.sprites.pine;
    let pine_scale = fit_scale(1.0, pine_base, cfg.spawn.pine_target);
    let reward = reward_anchor(&road, lane, pine_base.scaled(pine_scale)).map(|at| {
        let pine = store.spawn(EntityKind::Pine, at, pine_base);
        pine.scale = pine_scale;
        pine.id
    });
    (road.id, reward)
}

/// Spawn hazards until the budget is met, each one further along the track.
pub fn spawn_wave(
    store: &mut EntityStore,
    budget: &mut HazardBudget,
    ctx: &SpawnContext,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) -> Vec<EntityId> {
    let start = ahead_x(ctx, &cfg.spawn, rng);
    let mut placed = Vec::new();
    while budget.next() {
        let x = start + placed.len() as f32 * cfg.spawn.wave_spacing;
        placed.push(spawn_hazard(store, x, ctx.ground_y, cfg));
    }
    placed
}

/// Run one spawn cycle for `variant`. Returns every entity created.
pub fn spawn_variant(
    variant: SpawnVariant,
    state: &mut SpawnState,
    store: &mut EntityStore,
    ctx: &SpawnContext,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) -> Vec<EntityId> {
    state.last_variant = Some(variant);
    match variant {
        SpawnVariant::Hazard => {
            let x = ahead_x(ctx, &cfg.spawn, rng);
            vec![spawn_hazard(store, x, ctx.ground_y, cfg)]
        }
        SpawnVariant::Road => {
            let x = ahead_x(ctx, &cfg.spawn, rng);
            let lane = random_in_range(rng, 0, 2) as u8;
            let (road, reward) = spawn_road(store, x, ctx.ground_y, lane, cfg);
            std::iter::once(road).chain(reward).collect()
        }
        SpawnVariant::Wave => {
            state.budget.reroll(ctx.score, &cfg.spawn, rng);
            spawn_wave(store, &mut state.budget, ctx, cfg, rng)
        }
    }
}

// ── Per-tick driver ───────────────────────────────────────────────────────────

/// Advance the spawn timer and interval; fire a cycle when due.
pub fn run_spawner(
    state: &mut SpawnState,
    store: &mut EntityStore,
    ctx: &SpawnContext,
    dt: f32,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) -> Vec<EntityId> {
    if state.timer.is_paused() {
        return Vec::new();
    }
    state.timer.advance(dt);

    let spawn = &cfg.spawn;
    if state.interval > spawn.interval_floor {
        state.interval = (state.interval - dt / spawn.interval_decay_divisor).max(spawn.interval_floor);
    }

    if state.timer.elapsed() < state.threshold {
        return Vec::new();
    }

    let variant = SpawnVariant::from_roll(random_in_range(rng, 0, 2));
    state.timer.reset();
    state.threshold = roll_threshold(state.interval, spawn, rng);

    let created = spawn_variant(variant, state, store, ctx, cfg, rng);
    debug!(
        "spawn cycle {:?}: {} entities, next in {:.2}s",
        variant,
        created.len(),
        state.threshold
    );
    created
}
