//! Session driver: owns the core state and its collaborators, advances the
//! simulation once per frame and turns the frame's events into sounds and
//! saves.

use log::{debug, warn};
use rand::Rng;

use crate::compute;
use crate::config::GameConfig;
use crate::entities::{GameEvent, GameSession};
use crate::error::PersistenceError;
use crate::persist::KeyValueStore;
use crate::ports::{AudioPlayer, Cue, InputSource};
use crate::score::HighScoreBridge;
use crate::snapshot::{snapshot, Snapshot};

pub struct Runner<S, A, R> {
    config: GameConfig,
    session: GameSession,
    bridge: HighScoreBridge<S>,
    audio: A,
    rng: R,
    startup_warning: Option<PersistenceError>,
    last_write_error: Option<PersistenceError>,
}

impl<S, A, R> Runner<S, A, R>
where
    S: KeyValueStore,
    A: AudioPlayer,
    R: Rng,
{
    /// Load the high score once, then build the first scene. An unreadable
    /// store is reported through `startup_warning` and treated as empty.
    pub fn new(config: GameConfig, store: S, audio: A, rng: R) -> Self {
        let config = config.sanitized();
        let mut bridge = HighScoreBridge::new(store);
        let (high_score, startup_warning) = match bridge.load() {
            Ok(value) => (value, None),
            Err(e) => {
                warn!("no high score available, continuing without one: {}", e);
                (None, Some(e))
            }
        };
        let session = compute::init_state(&config, high_score);
        Runner {
            config,
            session,
            bridge,
            audio,
            rng,
            startup_warning,
            last_write_error: None,
        }
    }

    /// Advance one frame. Returns the events this frame produced.
    pub fn tick(&mut self, dt: f32, input: &impl InputSource) -> &[GameEvent] {
        let frame = input.sample();
        self.session = compute::tick(&self.session, &frame, dt, &self.config, &mut self.rng);
        self.dispatch();
        &self.session.events
    }

    fn dispatch(&mut self) {
        for event in &self.session.events {
            debug!("event {:?}", event);
            match event {
                GameEvent::Jumped => self.audio.play(Cue::Jump),
                GameEvent::BonusCollected { .. } => self.audio.play(Cue::Bonus),
                GameEvent::Died { .. } => self.audio.play(Cue::Death),
                GameEvent::HighScoreBeaten(score) => {
                    self.last_write_error = self.bridge.persist(*score).err();
                }
                GameEvent::Started | GameEvent::Restarted => {}
            }
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        snapshot(&self.session, &self.config)
    }

    pub fn bridge(&self) -> &HighScoreBridge<S> {
        &self.bridge
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn startup_warning(&self) -> Option<&PersistenceError> {
        self.startup_warning.as_ref()
    }

    pub fn last_write_error(&self) -> Option<&PersistenceError> {
        self.last_write_error.as_ref()
    }
}
