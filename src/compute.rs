//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `GameSession` (plus the config and, where needed, an RNG handle) and
//! returns a brand-new `GameSession`. Side effects are limited to the
//! injected RNG; sounds and saves are requested through
//! `GameSession::events` and carried out by the caller.

use log::{debug, info};
use rand::Rng;

use crate::clock::{sanitize_dt, Latches, SimClock};
use crate::collision;
use crate::config::GameConfig;
use crate::entities::{
    EntityKind, GameEvent, GameSession, GameStatus, InputFrame, JumpState, Rect, Size, Vec2,
};
use crate::physics;
use crate::score::{beats, high_score_text, score_text, total_score};
use crate::spawner::{self, SpawnContext, SpawnState};
use crate::world::EntityStore;

/// Per-run objects that lose their forces on death and die with the run.
const TRANSIENT_KINDS: [EntityKind; 3] = [EntityKind::Poison, EntityKind::Road, EntityKind::Pine];

/// Everything that is dropped once it falls behind the player.
const PRUNED_KINDS: [EntityKind; 4] = [
    EntityKind::WoodBackground,
    EntityKind::Poison,
    EntityKind::Road,
    EntityKind::Pine,
];

// ── Prompts ──────────────────────────────────────────────────────────────────

fn start_prompt(cfg: &GameConfig) -> &'static str {
    if cfg.session.touch_prompts {
        "Touch anywhere On screen to jump/start"
    } else {
        "Press any key to jump/start"
    }
}

fn restart_prompt(cfg: &GameConfig) -> &'static str {
    if cfg.session.touch_prompts {
        "Touch anywhere On screen to restart"
    } else {
        "Press any key to restart the game"
    }
}

fn set_text(store: &mut EntityStore, kind: EntityKind, text: String) {
    if let Some(e) = store.first_mut(kind) {
        e.text = Some(text);
    }
}

fn set_visible(store: &mut EntityStore, kind: EntityKind, visible: bool) {
    for e in store.query_mut(kind) {
        e.visible = visible;
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh scene in `Preparing`, keeping a known high score.
pub fn init_state(cfg: &GameConfig, high_score: Option<u64>) -> GameSession {
    let world = &cfg.world;
    let player = physics::spawn_player(&cfg.player, world, cfg.sprites.player);
    let camera_x = physics::camera_x(&player, world);

    let mut store = EntityStore::new();
    store.spawn(
        EntityKind::ForestBackground,
        Vec2::new(camera_x, 0.0),
        Size::new(world.view_width, world.view_height),
    );
    physics::extend_ground(&mut store, world, camera_x);
    physics::update_parallax(&mut store, camera_x);

    store.spawn(EntityKind::ScoreText, Vec2::new(20.0, 20.0), Size::default()).text =
        Some(score_text(0));
    store.spawn(EntityKind::HighScoreText, Vec2::new(20.0, 60.0), Size::default()).text =
        Some(high_score_text(high_score));
    store
        .spawn(
            EntityKind::TutorialText,
            Vec2::new(world.view_width / 2.0, world.view_height / 3.0),
            Size::default(),
        )
        .text = Some(start_prompt(cfg).to_string());

    GameSession {
        status: GameStatus::Preparing,
        player,
        store,
        spawn: SpawnState::new(&cfg.spawn),
        latches: Latches::default(),
        clock: SimClock::default(),
        run_time: 0.0,
        dead_time: 0.0,
        bonus_points: 0,
        score: 0,
        high_score,
        camera_x,
        events: Vec::new(),
    }
}

// ── State transitions (pure) ─────────────────────────────────────────────────

/// `Preparing` → `Playing`.
pub fn start_run(state: &GameSession, cfg: &GameConfig, rng: &mut impl Rng) -> GameSession {
    let mut next = state.clone();
    enter_playing(&mut next, cfg, rng);
    next
}

/// `Playing` → `Dead`.
pub fn kill_player(state: &GameSession) -> GameSession {
    let mut next = state.clone();
    enter_dead(&mut next);
    next
}

/// Back to `Preparing` with an empty field; only the high score and the
/// simulation clock survive.
pub fn restart(state: &GameSession, cfg: &GameConfig) -> GameSession {
    let mut next = init_state(cfg, state.high_score);
    next.clock = state.clock.clone();
    next.events.push(GameEvent::Restarted);
    info!("session restarted");
    next
}

fn enter_playing(s: &mut GameSession, cfg: &GameConfig, rng: &mut impl Rng) {
    s.status = GameStatus::Playing;
    s.spawn.timer.reset();
    s.spawn.threshold = spawner::roll_threshold(s.spawn.interval, &cfg.spawn, rng);
    s.player.controls_enabled = true;
    set_visible(&mut s.store, EntityKind::TutorialText, false);
    s.events.push(GameEvent::Started);
    info!("run started");
}

fn enter_dead(s: &mut GameSession) {
    physics::abort_jump(&mut s.player);
    s.player.controls_enabled = false;
    s.player.velocity.x = 0.0;
    s.status = GameStatus::Dead;
    s.dead_time = 0.0;
    s.spawn.timer.pause();
    physics::clear_forces(&mut s.store, &TRANSIENT_KINDS);
    s.events.push(GameEvent::Died { score: s.score });
    info!("player died with score {}", s.score);

    if beats(s.score, s.high_score) {
        s.high_score = Some(s.score);
        set_text(&mut s.store, EntityKind::ScoreText, score_text(s.score));
        set_text(
            &mut s.store,
            EntityKind::HighScoreText,
            high_score_text(s.high_score),
        );
        s.events.push(GameEvent::HighScoreBeaten(s.score));
    }
}

// ── Per-frame tick (RNG injected) ────────────────────────────────────────────

/// Advance the simulation by `dt` seconds. All randomness comes through
/// `rng` so callers control determinism.
pub fn tick(
    state: &GameSession,
    input: &InputFrame,
    dt: f32,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) -> GameSession {
    let dt = sanitize_dt(dt, cfg.world.max_frame_dt);
    debug_assert!(dt.is_finite() && dt >= 0.0);

    let mut next = state.clone();
    next.events.clear();
    next.clock.advance(dt);

    match next.status {
        GameStatus::Preparing => step_preparing(&mut next, input, cfg, rng),
        GameStatus::Playing => step_playing(&mut next, input, dt, cfg, rng),
        GameStatus::Dead => {
            if step_dead(&mut next, input, dt, cfg) {
                return restart(&next, cfg);
            }
        }
    }
    next
}

fn step_preparing(s: &mut GameSession, input: &InputFrame, cfg: &GameConfig, rng: &mut impl Rng) {
    // Holding the start key must not also jump on the first playing tick.
    s.latches.jump_input.trigger(input.jump_requested);
    if input.any_key_released || input.pointer_pressed || input.jump_requested {
        enter_playing(s, cfg, rng);
    }
}

fn road_tops(store: &EntityStore) -> Vec<Rect> {
    store
        .rects(EntityKind::Road)
        .into_iter()
        .map(|(_, r)| r)
        .collect()
}

fn step_playing(
    s: &mut GameSession,
    input: &InputFrame,
    dt: f32,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) {
    s.run_time += dt as f64;

    // ── 1. Physics & movement ────────────────────────────────────────────────
    let pc = &cfg.player;
    physics::ramp_max_speed(&mut s.player, dt, pc);
    if s.latches.jump_input.trigger(input.jump_requested) {
        physics::request_jump(&mut s.player, pc);
    }
    physics::run_forward(&mut s.player, dt, pc);
    let platforms = road_tops(&s.store);
    physics::integrate_player(&mut s.player, &platforms, dt, pc, cfg.world.ground_y);
    debug_assert!(s.player.rect().bottom() <= cfg.world.ground_y + 0.001);

    let ascending = s.player.jump == JumpState::Jumping && s.player.velocity.y < 0.0;
    if s.latches.jump_cue.trigger(ascending) {
        s.events.push(GameEvent::Jumped);
    }

    physics::drift_entities(&mut s.store, &TRANSIENT_KINDS, dt);
    s.camera_x = physics::camera_x(&s.player, &cfg.world);
    physics::update_parallax(&mut s.store, s.camera_x);

    // ── 2. Spawner ───────────────────────────────────────────────────────────
    let ctx = SpawnContext {
        player_x: s.player.pos.x,
        ground_y: cfg.world.ground_y,
        score: s.score,
    };
    spawner::run_spawner(&mut s.spawn, &mut s.store, &ctx, dt, cfg, rng);

    // ── 3. Collision: rewards first, then hazards ────────────────────────────
    let body = s.player.rect();
    let collected = collision::collect_rewards(&body, &mut s.store);
    for _ in 0..collected {
        s.bonus_points += cfg.score.bonus_points;
        s.events.push(GameEvent::BonusCollected {
            points: cfg.score.bonus_points,
        });
    }
    s.score = total_score(s.run_time, s.bonus_points, &cfg.score);

    if let Some(hazard) = collision::first_hazard_hit(&body, &s.store) {
        debug!("hit hazard {:?} at x={:.1}", hazard, body.x);
        enter_dead(s);
    }

    // ── 4. Prune & refill ────────────────────────────────────────────────────
    let pruned = physics::prune_behind(
        &mut s.store,
        &PRUNED_KINDS,
        s.player.pos.x,
        cfg.world.prune_margin,
    );
    if pruned > 0 {
        debug!("pruned {} entities behind the player", pruned);
    }
    physics::extend_ground(&mut s.store, &cfg.world, s.camera_x);

    // ── 5. HUD ───────────────────────────────────────────────────────────────
    set_text(&mut s.store, EntityKind::ScoreText, score_text(s.score));
}

/// Returns `true` when the player asked for a restart and the delay passed.
fn step_dead(s: &mut GameSession, input: &InputFrame, dt: f32, cfg: &GameConfig) -> bool {
    s.dead_time += dt;

    // Only gravity keeps working so a mid-air death settles on the ground.
    let platforms = road_tops(&s.store);
    physics::integrate_player(&mut s.player, &platforms, dt, &cfg.player, cfg.world.ground_y);

    if s.latches.restart_prompt.trigger(true) {
        set_text(
            &mut s.store,
            EntityKind::TutorialText,
            restart_prompt(cfg).to_string(),
        );
        set_visible(&mut s.store, EntityKind::TutorialText, true);
    }

    s.dead_time >= cfg.session.restart_delay && (input.any_key_released || input.pointer_pressed)
}
