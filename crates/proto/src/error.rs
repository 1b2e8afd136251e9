use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading/validation error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Relay endpoint error.
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    /// Client stream consumption error.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Internal protocol type error.
    #[error("Proto error: {0}")]
    Proto(#[from] ProtoError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// Relay endpoint errors
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream completion call failed before or during streaming.
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// Binding or serving the HTTP endpoint failed.
    #[error("Server error: {0}")]
    Server(String),
}

/// Stream consumer errors
#[derive(Debug, Error)]
pub enum StreamError {
    /// The request to the relay could not be completed.
    #[error("Request failed: {0}")]
    Request(String),

    /// Reading the relay's byte stream failed mid-flight.
    #[error("Stream read failed: {0}")]
    Read(String),
}

/// Internal proto errors
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Invalid role string value.
    #[error("Invalid role: {0}")]
    InvalidRole(String),
}
