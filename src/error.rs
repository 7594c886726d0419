//! Error types
//!
//! Nothing here is fatal: validation errors re-prompt the player and
//! persistence errors fall back to in-memory defaults.

use thiserror::Error;

/// Rejected player input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your name!")]
    BlankName,
}

/// Failure talking to the key-value store or decoding what it holds
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },

    #[error("corrupt data under `{key}`")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage unavailable")]
    Unavailable,
}

impl PersistenceError {
    pub fn read(key: &str, reason: impl ToString) -> Self {
        Self::Read {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(key: &str, reason: impl ToString) -> Self {
        Self::Write {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
