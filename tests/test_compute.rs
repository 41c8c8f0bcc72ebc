use rand::rngs::StdRng;
use rand::SeedableRng;

use snail_runner::clock::Latches;
use snail_runner::compute::{init_state, kill_player, restart, start_run, tick};
use snail_runner::config::GameConfig;
use snail_runner::entities::*;
use snail_runner::spawner;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle() -> InputFrame {
    InputFrame::default()
}

fn jump() -> InputFrame {
    InputFrame {
        jump_requested: true,
        ..InputFrame::default()
    }
}

fn release() -> InputFrame {
    InputFrame {
        any_key_released: true,
        ..InputFrame::default()
    }
}

/// A session that has just entered `Playing`.
fn playing(cfg: &GameConfig, rng: &mut StdRng) -> GameSession {
    let s = init_state(cfg, None);
    tick(&s, &release(), 0.016, cfg, rng)
}

fn text_of(s: &GameSession, kind: EntityKind) -> String {
    s.store
        .first(kind)
        .and_then(|e| e.text.clone())
        .unwrap_or_default()
}

/// Drop a poison right on top of the player.
fn hazard_on_player(s: &mut GameSession, cfg: &GameConfig) -> EntityId {
    let x = s.player.pos.x;
    spawner::spawn_hazard(&mut s.store, x, cfg.world.ground_y, cfg)
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_builds_preparing_scene() {
    let cfg = GameConfig::default();
    let s = init_state(&cfg, Some(1200));

    assert_eq!(s.status, GameStatus::Preparing);
    assert_eq!(s.score, 0);
    assert_eq!(s.high_score, Some(1200));
    assert!(!s.player.controls_enabled);
    assert_eq!(s.player.rect().bottom(), cfg.world.ground_y);
    assert_eq!(s.store.count(EntityKind::WoodBackground), 2);
    assert_eq!(s.store.count(EntityKind::ForestBackground), 1);
    assert_eq!(s.store.count(EntityKind::Poison), 0);
    assert_eq!(text_of(&s, EntityKind::ScoreText), "Score: 0");
    assert_eq!(text_of(&s, EntityKind::HighScoreText), "Highscore: 1200");
    assert_eq!(
        text_of(&s, EntityKind::TutorialText),
        "Press any key to jump/start"
    );
}

#[test]
fn init_state_touch_prompt() {
    let mut cfg = GameConfig::default();
    cfg.session.touch_prompts = true;
    let s = init_state(&cfg, None);
    assert_eq!(
        text_of(&s, EntityKind::TutorialText),
        "Touch anywhere On screen to jump/start"
    );
    assert_eq!(text_of(&s, EntityKind::HighScoreText), "Highscore: -");
}

// ── Preparing ─────────────────────────────────────────────────────────────────

#[test]
fn idle_preparing_does_nothing() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = init_state(&cfg, None);
    let next = tick(&s, &idle(), 0.1, &cfg, &mut rng);

    assert_eq!(next.status, GameStatus::Preparing);
    assert_eq!(next.player.pos, s.player.pos);
    assert!(next.events.is_empty());
}

#[test]
fn jump_request_starts_run() {
    // Preparing + jump → Playing, spawn timer at zero, controls live.
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = init_state(&cfg, None);
    let next = tick(&s, &jump(), 0.016, &cfg, &mut rng);

    assert_eq!(next.status, GameStatus::Playing);
    assert_eq!(next.spawn.timer.elapsed(), 0.0);
    assert!(!next.spawn.timer.is_paused());
    assert!(next.player.controls_enabled);
    assert_eq!(next.events, vec![GameEvent::Started]);
    let tutorial = next.store.first(EntityKind::TutorialText).unwrap();
    assert!(!tutorial.visible);
}

#[test]
fn pointer_press_starts_run() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = init_state(&cfg, None);
    let input = InputFrame {
        pointer_pressed: true,
        ..InputFrame::default()
    };
    assert_eq!(tick(&s, &input, 0.016, &cfg, &mut rng).status, GameStatus::Playing);
}

#[test]
fn tick_does_not_mutate_input_state() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = init_state(&cfg, None);
    let _ = tick(&s, &jump(), 0.016, &cfg, &mut rng);
    assert_eq!(s.status, GameStatus::Preparing);
}

// ── Playing ───────────────────────────────────────────────────────────────────

#[test]
fn one_second_scores_one_hundred() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    assert_eq!(s.score, 0);

    // Frames are capped at max_frame_dt, so feed the second in slices.
    for _ in 0..10 {
        s = tick(&s, &idle(), 0.1, &cfg, &mut rng);
    }
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.score, 100);
    assert_eq!(text_of(&s, EntityKind::ScoreText), "Score: 100");
}

#[test]
fn oversized_frame_is_clamped() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = playing(&cfg, &mut rng);
    let next = tick(&s, &idle(), 5.0, &cfg, &mut rng);
    assert!((next.run_time - cfg.world.max_frame_dt as f64).abs() < 1e-6);
}

#[test]
fn non_finite_frame_is_ignored() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = playing(&cfg, &mut rng);
    let next = tick(&s, &idle(), f32::NAN, &cfg, &mut rng);
    assert_eq!(next.run_time, s.run_time);
    assert_eq!(next.player.pos, s.player.pos);
}

#[test]
fn player_runs_forward_and_camera_follows() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    let start_x = s.player.pos.x;
    for _ in 0..30 {
        s = tick(&s, &idle(), 0.033, &cfg, &mut rng);
    }
    assert!(s.player.pos.x > start_x);
    assert_eq!(s.camera_x, s.player.pos.x - cfg.world.player_screen_x);
    let forest = s.store.first(EntityKind::ForestBackground).unwrap();
    assert_eq!(forest.texture_offset, s.camera_x / 4.0);
}

#[test]
fn holding_start_key_does_not_jump() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = init_state(&cfg, None);
    let s = tick(&s, &jump(), 0.033, &cfg, &mut rng);
    let s = tick(&s, &jump(), 0.033, &cfg, &mut rng);

    assert_eq!(s.player.jump, JumpState::Grounded);
    assert!(!s.events.contains(&GameEvent::Jumped));
}

#[test]
fn fresh_press_jumps_once() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = playing(&cfg, &mut rng);

    let s = tick(&s, &jump(), 0.033, &cfg, &mut rng);
    assert_eq!(s.player.jump, JumpState::Jumping);
    assert!(s.player.velocity.y < 0.0);
    assert_eq!(
        s.events.iter().filter(|e| **e == GameEvent::Jumped).count(),
        1
    );

    // Still held: no second cue while the same ascent goes on.
    let s = tick(&s, &jump(), 0.033, &cfg, &mut rng);
    assert!(!s.events.contains(&GameEvent::Jumped));
}

#[test]
fn jump_lands_back_on_ground() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    s = tick(&s, &jump(), 0.033, &cfg, &mut rng);
    for _ in 0..90 {
        s = tick(&s, &idle(), 0.033, &cfg, &mut rng);
        if s.status != GameStatus::Playing {
            break;
        }
    }
    assert_eq!(s.player.jump, JumpState::Grounded);
    assert_eq!(s.player.rect().bottom(), cfg.world.ground_y);
}

#[test]
fn pine_pickup_adds_bonus() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    let body = s.player.rect();
    s.store
        .spawn(EntityKind::Pine, Vec2::new(body.x, body.y), Size::new(40.0, 40.0));

    let next = tick(&s, &idle(), 0.0, &cfg, &mut rng);
    assert_eq!(next.store.count(EntityKind::Pine), 0);
    assert_eq!(next.bonus_points, 500);
    assert_eq!(next.score, 500);
    assert_eq!(next.events, vec![GameEvent::BonusCollected { points: 500 }]);
}

#[test]
fn pine_touching_the_front_edge_is_collected() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    let body = s.player.rect();
    s.store
        .spawn(EntityKind::Pine, Vec2::new(body.right(), body.y), Size::new(40.0, 40.0));

    let next = tick(&s, &idle(), 0.0, &cfg, &mut rng);
    assert_eq!(next.store.count(EntityKind::Pine), 0);
    assert_eq!(next.bonus_points, 500);
}

#[test]
fn ground_tiles_are_replenished() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    // Teleport far ahead so the original tiles fall behind.
    s.player.pos.x += 5000.0;
    let next = tick(&s, &idle(), 0.016, &cfg, &mut rng);

    let tiles = next.store.query(EntityKind::WoodBackground);
    assert_eq!(tiles.len(), 2);
    for t in tiles {
        assert!(t.pos.x >= next.player.pos.x - t.size().width - cfg.world.prune_margin);
    }
}

// ── Death ─────────────────────────────────────────────────────────────────────

#[test]
fn hazard_contact_kills() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    hazard_on_player(&mut s, &cfg);

    // Give every transient kind a force to check they are all cleared.
    let road = s
        .store
        .spawn(EntityKind::Road, Vec2::new(3000.0, 300.0), Size::new(100.0, 20.0));
    road.velocity = Some(Vec2::new(-50.0, 0.0));
    let pine = s
        .store
        .spawn(EntityKind::Pine, Vec2::new(3000.0, 200.0), Size::new(40.0, 40.0));
    pine.velocity = Some(Vec2::new(-50.0, 0.0));
    for e in s.store.query_mut(EntityKind::Poison) {
        e.velocity = Some(Vec2::new(-50.0, 0.0));
    }

    let next = tick(&s, &idle(), 0.016, &cfg, &mut rng);

    assert_eq!(next.status, GameStatus::Dead);
    assert!(next.spawn.timer.is_paused());
    assert!(!next.player.controls_enabled);
    for kind in [EntityKind::Poison, EntityKind::Road, EntityKind::Pine] {
        for e in next.store.query(kind) {
            assert_eq!(e.velocity, None, "{:?} still has a force", kind);
        }
    }
    assert!(next
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::Died { .. })));
}

#[test]
fn death_beating_record_updates_high_score() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    s.high_score = Some(500);
    s.run_time = 8.0;
    hazard_on_player(&mut s, &cfg);

    let next = tick(&s, &idle(), 0.0, &cfg, &mut rng);
    assert_eq!(next.score, 800);
    assert_eq!(next.high_score, Some(800));
    assert_eq!(text_of(&next, EntityKind::HighScoreText), "Highscore: 800");
    assert_eq!(
        next.events,
        vec![GameEvent::Died { score: 800 }, GameEvent::HighScoreBeaten(800)]
    );
}

#[test]
fn death_below_record_keeps_it() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    s.high_score = Some(5000);
    s.run_time = 1.0;
    let next = kill_player(&s);
    assert_eq!(next.high_score, Some(5000));
    assert!(!next
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::HighScoreBeaten(_))));
}

#[test]
fn zero_score_never_sets_a_record() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = playing(&cfg, &mut rng);
    let next = kill_player(&s);
    assert_eq!(next.high_score, None);
}

#[test]
fn dead_session_is_frozen() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    s.run_time = 3.0;
    let dead = kill_player(&s);
    let mut later = dead.clone();
    for _ in 0..20 {
        later = tick(&later, &jump(), 0.1, &cfg, &mut rng);
    }

    assert_eq!(later.status, GameStatus::Dead);
    assert_eq!(later.score, dead.score);
    assert_eq!(later.player.max_speed, dead.player.max_speed);
    assert_eq!(later.player.pos.x, dead.player.pos.x);
    assert_eq!(later.spawn.timer.elapsed(), dead.spawn.timer.elapsed());
    assert_eq!(
        later.store.count(EntityKind::Poison),
        dead.store.count(EntityKind::Poison)
    );
}

#[test]
fn mid_air_death_settles_on_ground() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    s.player.pos.y -= 150.0;
    s.player.jump = JumpState::Jumping;
    s.player.velocity.y = -400.0;

    let mut dead = kill_player(&s);
    assert_eq!(dead.player.velocity.y, 0.0);
    for _ in 0..30 {
        dead = tick(&dead, &idle(), 0.033, &cfg, &mut rng);
    }
    assert_eq!(dead.player.rect().bottom(), cfg.world.ground_y);
}

#[test]
fn restart_prompt_shown_after_death() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = playing(&cfg, &mut rng);
    let dead = tick(&kill_player(&s), &idle(), 0.016, &cfg, &mut rng);

    let tutorial = dead.store.first(EntityKind::TutorialText).unwrap();
    assert!(tutorial.visible);
    assert_eq!(
        tutorial.text.as_deref(),
        Some("Press any key to restart the game")
    );
}

// ── Restart ───────────────────────────────────────────────────────────────────

#[test]
fn restart_waits_for_delay() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = playing(&cfg, &mut rng);
    let dead = kill_player(&s);

    // Too early: the key that killed you must not restart instantly.
    let early = tick(&dead, &release(), 0.1, &cfg, &mut rng);
    assert_eq!(early.status, GameStatus::Dead);

    let mut waited = early;
    for _ in 0..5 {
        waited = tick(&waited, &idle(), 0.1, &cfg, &mut rng);
    }
    let restarted = tick(&waited, &release(), 0.1, &cfg, &mut rng);
    assert_eq!(restarted.status, GameStatus::Preparing);
    assert_eq!(restarted.events, vec![GameEvent::Restarted]);
}

#[test]
fn restart_keeps_only_high_score() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    s.run_time = 12.0;
    s.score = 1200;
    spawner::spawn_hazard(&mut s.store, s.player.pos.x + 2000.0, cfg.world.ground_y, &cfg);
    let dead = kill_player(&s);
    assert_eq!(dead.high_score, Some(1200));

    let fresh = restart(&dead, &cfg);
    assert_eq!(fresh.status, GameStatus::Preparing);
    assert_eq!(fresh.high_score, Some(1200));
    assert_eq!(fresh.score, 0);
    assert_eq!(fresh.run_time, 0.0);
    assert_eq!(fresh.store.count(EntityKind::Poison), 0);
    assert_eq!(fresh.latches, Latches::default());
    assert_eq!(fresh.player.max_speed, cfg.player.initial_max_speed);
    assert_eq!(text_of(&fresh, EntityKind::HighScoreText), "Highscore: 1200");
}

#[test]
fn start_run_from_restart_resets_timer() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let s = playing(&cfg, &mut rng);
    let fresh = restart(&kill_player(&s), &cfg);
    let again = start_run(&fresh, &cfg, &mut rng);
    assert_eq!(again.status, GameStatus::Playing);
    assert_eq!(again.spawn.timer.elapsed(), 0.0);
    assert!(again.spawn.threshold >= cfg.spawn.interval_start * cfg.spawn.jitter_min);
    assert!(again.spawn.threshold <= cfg.spawn.interval_start * cfg.spawn.jitter_max);
}

// ── Long run ──────────────────────────────────────────────────────────────────

#[test]
fn long_run_spawns_and_stays_consistent() {
    let cfg = GameConfig::default();
    let mut rng = rng();
    let mut s = playing(&cfg, &mut rng);
    let mut spawned_something = false;
    for _ in 0..300 {
        s = tick(&s, &idle(), 0.033, &cfg, &mut rng);
        spawned_something |= s.spawn.last_variant.is_some();
        if s.status == GameStatus::Dead {
            break;
        }
        assert!(s.player.rect().bottom() <= cfg.world.ground_y + 0.001);
        assert!(s.store.count(EntityKind::WoodBackground) >= 2);
    }
    assert!(spawned_something);
}
