//! Unified error types for the enterprise client and the midway server.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the terminal client's event loop
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Wire protocol decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Empty message")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing field '{field}' in '{command}'")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },

    #[error("Invalid value '{value}' for field '{field}' in '{command}'")]
    InvalidField {
        command: &'static str,
        field: &'static str,
        value: String,
    },
}

/// Client-side connection errors
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid ip address: {0}")]
    InvalidAddress(String),

    #[error("Invalid ship name: {0:?}")]
    InvalidName(String),

    #[error("Could not connect to Midway: {0}")]
    ConnectFailed(std::io::Error),

    #[error("Handshake failed: {0}")]
    Handshake(std::io::Error),

    #[error("Not connected")]
    NotConnected,
}

/// Midway server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Invalid handshake from {0}")]
    InvalidHandshake(String),

    #[error("Handshake timed out for {0}")]
    HandshakeTimeout(String),

    #[error("Ship name already taken: {0}")]
    NameTaken(String),

    #[error("Game loop stopped: {0}")]
    Stopped(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for protocol decoding
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Result type alias for client connection operations
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Result type alias for server operations
pub type ServerResult<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_loop_errors() {
        let error = AppError::Terminal("poll failed".to_string());
        assert_eq!(error.to_string(), "Terminal error: poll failed");

        let error: AppError = std::io::Error::other("tty closed").into();
        assert!(matches!(error, AppError::Io(_)));
    }
}
