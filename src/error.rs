use std::path::PathBuf;

use thiserror::Error;

/// Failures of the external key-value store. Neither kind is fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("cannot read {namespace}/{key}: {reason}")]
    Read {
        namespace: String,
        key: String,
        reason: String,
    },
    #[error("cannot write {namespace}/{key}: {reason}")]
    Write {
        namespace: String,
        key: String,
        reason: String,
    },
}

impl PersistenceError {
    pub fn read(namespace: &str, key: &str, reason: impl ToString) -> Self {
        PersistenceError::Read {
            namespace: namespace.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(namespace: &str, key: &str, reason: impl ToString) -> Self {
        PersistenceError::Write {
            namespace: namespace.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}
