mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use snail_runner::config::GameConfig;
use snail_runner::entities::InputFrame;
use snail_runner::persist::JsonFileStore;
use snail_runner::ports::{AudioPlayer, Cue};
use snail_runner::runner::Runner;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// A key counts as held if its last press/repeat arrived within this many
/// frames. Classic terminals never send releases, so held keys expire.
const HOLD_WINDOW: u64 = 4;

const JUMP_KEYS: [KeyCode; 4] = [
    KeyCode::Up,
    KeyCode::Char(' '),
    KeyCode::Char('w'),
    KeyCode::Char('W'),
];

const CONFIG_ENV: &str = "SNAIL_RUNNER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "snail_runner.ron";

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Files ─────────────────────────────────────────────────────────────────────

fn data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("snail_runner"),
        None => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".snail_runner")
        }
    }
}

/// The explicit path from the environment must exist; the default file is
/// optional.
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

/// The terminal belongs to the game, so logs go to a file.
fn init_logging(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating data directory {}", dir.display()))?;
    let path = dir.join("snail_runner.log");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// Rings the terminal bell for the cues worth interrupting for.
struct BellAudio;

impl AudioPlayer for BellAudio {
    fn play(&mut self, cue: Cue) {
        log::debug!("cue {}", cue.id());
        if cue == Cue::Jump {
            return;
        }
        let mut out = stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Jump is a held input: `key_frame` records the frame each key was last
/// seen and a key stays live for `HOLD_WINDOW` frames. "Any key released"
/// comes from real `Release` events on keyboard-enhanced terminals and from
/// plain presses everywhere else.
fn game_loop<W, S, A, R>(
    out: &mut W,
    runner: &mut Runner<S, A, R>,
    rx: &mpsc::Receiver<Event>,
    keyboard_enhanced: bool,
) -> anyhow::Result<()>
where
    W: Write,
    S: snail_runner::persist::KeyValueStore,
    A: AudioPlayer,
    R: rand::Rng,
{
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        let mut released = false;
        let mut pointer = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(());
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(());
                            }
                            _ => {}
                        }
                        key_frame.insert(code, frame);
                        if !keyboard_enhanced {
                            released = true;
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                        released = true;
                    }
                },
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    ..
                }) => pointer = true,
                _ => {}
            }
        }

        let jump = pointer || JUMP_KEYS.iter().any(|k| is_held(&key_frame, k, frame));
        let input = InputFrame {
            jump_requested: jump,
            any_key_released: released,
            pointer_pressed: pointer,
        };

        let dt = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        runner.tick(dt, &input);

        let (cols, rows) = terminal::size()?;
        display::render(out, &runner.snapshot(), cols, rows)?;

        if let Some(err) = runner.last_write_error() {
            log::debug!("high score still pending: {}", err);
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let data = data_dir();
    init_logging(&data)?;

    let config_file = config_path();
    let config = GameConfig::load_or_default(config_file.as_deref()).context("loading config")?;
    info!(
        "config from {}",
        config_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );

    let store = JsonFileStore::new(&data);
    let mut runner = Runner::new(config, store, BellAudio, StdRng::from_entropy());
    if let Some(err) = runner.startup_warning() {
        warn!("starting without a stored high score: {}", err);
    }

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Ask for key-release events; terminals without the kitty protocol
    // refuse and we fall back to presses.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    info!("keyboard enhancement: {}", keyboard_enhanced);

    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &mut runner, &rx, keyboard_enhanced);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Some(best) = runner.session().high_score {
        info!("best score this session: {}", best);
    }
    result
}
