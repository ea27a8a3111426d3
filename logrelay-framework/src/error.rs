//! Error types for the relay framework.

use thiserror::Error;

/// Result type alias using [`RelayError`].
pub type Result<T> = std::result::Result<T, RelayError>;

/// Startup and lifecycle errors.
///
/// Everything in here is fatal: the relay exits before serving.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// A sink could not be constructed.
    #[error("Failed to set up {sink} sink: {message}")]
    SinkSetup { sink: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RelayError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a sink setup error.
    pub fn sink_setup(sink: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::SinkSetup {
            sink: sink.into(),
            message: msg.into(),
        }
    }

    /// Wrap an error with context.
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

impl From<logrelay_common::Error> for RelayError {
    fn from(err: logrelay_common::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<json5::Error> for RelayError {
    fn from(err: json5::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

/// A single failed delivery.
///
/// Recoverable: the dispatcher reports it and moves on to the next sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing to a stream or file failed.
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    /// The remote endpoint answered with a non-success status.
    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection refused, DNS failure and other transport errors.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request body could not be built.
    #[error("failed to build body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Body(err.to_string())
    }
}
