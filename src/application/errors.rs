//! Application layer errors

use thiserror::Error;

/// General controller errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate bot configuration: {0}")]
    Duplicate(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Errors raised by the in-memory host
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Bot {bot} is not online")]
    Offline { bot: String },
}

/// Event replay errors
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed event on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}
