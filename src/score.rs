//! Running score and the bridge to the persisted high score.

use log::{info, warn};

use crate::config::ScoreConfig;
use crate::error::PersistenceError;
use crate::persist::KeyValueStore;

pub const HIGH_SCORE_NAMESPACE: &str = "Highscore";
pub const HIGH_SCORE_KEY: &str = "Highscore";

// ── Score ─────────────────────────────────────────────────────────────────────

/// Points earned by surviving `run_time` seconds.
pub fn time_points(run_time: f64, cfg: &ScoreConfig) -> u64 {
    let points = (run_time * cfg.points_per_second).round();
    if points.is_finite() && points > 0.0 {
        points as u64
    } else {
        0
    }
}

pub fn total_score(run_time: f64, bonus_points: u64, cfg: &ScoreConfig) -> u64 {
    time_points(run_time, cfg).saturating_add(bonus_points)
}

pub fn score_text(score: u64) -> String {
    format!("Score: {}", score)
}

pub fn high_score_text(high_score: Option<u64>) -> String {
    match high_score {
        Some(v) => format!("Highscore: {}", v),
        None => "Highscore: -".to_string(),
    }
}

/// `score` beats `high_score`; an absent record counts as zero.
pub fn beats(score: u64, high_score: Option<u64>) -> bool {
    score > high_score.unwrap_or(0)
}

// ── Persistence bridge ────────────────────────────────────────────────────────

/// Owns the store and remembers what it has read and written.
#[derive(Debug)]
pub struct HighScoreBridge<S> {
    store: S,
    loaded: Option<Option<u64>>,
    last_written: Option<u64>,
    pending: Option<u64>,
}

impl<S: KeyValueStore> HighScoreBridge<S> {
    pub fn new(store: S) -> Self {
        HighScoreBridge {
            store,
            loaded: None,
            last_written: None,
            pending: None,
        }
    }

    /// Read the record once. Later calls return the cached value without
    /// touching the store. A failed read is not cached.
    pub fn load(&mut self) -> Result<Option<u64>, PersistenceError> {
        if let Some(cached) = self.loaded {
            return Ok(cached);
        }
        let raw = self.store.read_number(HIGH_SCORE_NAMESPACE, HIGH_SCORE_KEY)?;
        let value = match raw {
            None => None,
            Some(n) if n.is_finite() && n >= 0.0 => Some(n.round() as u64),
            Some(n) => {
                return Err(PersistenceError::read(
                    HIGH_SCORE_NAMESPACE,
                    HIGH_SCORE_KEY,
                    format!("malformed record {}", n),
                ))
            }
        };
        info!("loaded high score: {:?}", value);
        self.loaded = Some(value);
        Ok(value)
    }

    /// Write `value`, folding in any earlier write that failed.
    /// On failure the value is kept and retried on the next call.
    pub fn persist(&mut self, value: u64) -> Result<(), PersistenceError> {
        let target = self.pending.map_or(value, |p| p.max(value));
        match self
            .store
            .write_number(HIGH_SCORE_NAMESPACE, HIGH_SCORE_KEY, target as f64)
        {
            Ok(()) => {
                info!("saved high score {}", target);
                self.pending = None;
                self.last_written = Some(target);
                Ok(())
            }
            Err(e) => {
                warn!("high score {} not saved, will retry: {}", target, e);
                self.pending = Some(target);
                Err(e)
            }
        }
    }

    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    pub fn last_written(&self) -> Option<u64> {
        self.last_written
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
