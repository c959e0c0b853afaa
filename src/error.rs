//! Error types for shell-bridge.

use thiserror::Error;

use crate::bridge::Encoding;

/// Main error type for shell-bridge operations.
#[derive(Error, Debug)]
pub enum ShellBridgeError {
    /// Command text cannot be represented in the bridge encoding.
    #[error("cannot encode {character:?} as {encoding}")]
    Encoding {
        encoding: Encoding,
        character: char,
    },

    /// Bridge has been closed.
    #[error("bridge closed")]
    Closed,

    /// A driver command was not accepted by the bridge.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// PTY-related error.
    #[error("PTY error: {0}")]
    Pty(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Background task failed or panicked.
    #[error("task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for ShellBridgeError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Join(e.to_string())
    }
}

/// Convenience Result type for shell-bridge operations.
pub type Result<T> = std::result::Result<T, ShellBridgeError>;
