//! Key-value number stores backing the high score.
//!
//! The core only sees the `KeyValueStore` trait. `MemoryStore` serves tests
//! and headless runs; `JsonFileStore` keeps one JSON object per namespace on
//! disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::PersistenceError;

pub trait KeyValueStore {
    /// `Ok(None)` when nothing was ever written under `namespace/key`.
    fn read_number(&self, namespace: &str, key: &str) -> Result<Option<f64>, PersistenceError>;

    fn write_number(&mut self, namespace: &str, key: &str, value: f64)
        -> Result<(), PersistenceError>;
}

// ── In-memory ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<(String, String), f64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_number(mut self, namespace: &str, key: &str, value: f64) -> Self {
        self.values
            .insert((namespace.to_string(), key.to_string()), value);
        self
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<f64> {
        self.values
            .get(&(namespace.to_string(), key.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read_number(&self, namespace: &str, key: &str) -> Result<Option<f64>, PersistenceError> {
        Ok(self.get(namespace, key))
    }

    fn write_number(
        &mut self,
        namespace: &str,
        key: &str,
        value: f64,
    ) -> Result<(), PersistenceError> {
        self.values
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }
}

// ── JSON files ────────────────────────────────────────────────────────────────

/// `<dir>/<namespace>.json` holding `{ "<key>": <number>, ... }`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, namespace: &str) -> PathBuf {
        let name: String = namespace
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }

    fn read_map(&self, namespace: &str, key: &str) -> Result<Option<Map<String, Value>>, PersistenceError> {
        let path = self.file_for(namespace);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::read(namespace, key, e)),
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(PersistenceError::read(namespace, key, "record is not a JSON object")),
            Err(e) => Err(PersistenceError::read(namespace, key, e)),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn read_number(&self, namespace: &str, key: &str) -> Result<Option<f64>, PersistenceError> {
        let Some(map) = self.read_map(namespace, key)? else {
            return Ok(None);
        };
        match map.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| PersistenceError::read(namespace, key, format!("not a number: {}", v))),
        }
    }

    fn write_number(
        &mut self,
        namespace: &str,
        key: &str,
        value: f64,
    ) -> Result<(), PersistenceError> {
        // A corrupt file is replaced rather than blocking the write.
        let mut map = self.read_map(namespace, key).ok().flatten().unwrap_or_default();
        let number = serde_json::Number::from_f64(value)
            .ok_or_else(|| PersistenceError::write(namespace, key, "value is not finite"))?;
        map.insert(key.to_string(), Value::Number(number));

        std::fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::write(namespace, key, e))?;
        let text = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| PersistenceError::write(namespace, key, e))?;
        std::fs::write(self.file_for(namespace), text)
            .map_err(|e| PersistenceError::write(namespace, key, e))
    }
}
