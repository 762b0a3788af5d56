//! Error types for agent-chain-debug.
//!
//! Recording an event never fails. These errors cover loading configuration
//! and writing a recorded trace out.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read debug config from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse debug config")]
    Parse(#[from] serde_json_lenient::Error),

    #[error("invalid debug config: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidEnv {
            key: key.into(),
            value: value.into(),
        }
    }
}
