//! Delivery targets for normalized log entries.

mod console;
mod file;
mod format;
mod http;

pub use console::{ConsoleSink, ConsoleSinkConfig, ConsoleStream};
pub use file::{FileSink, FileSinkConfig};
pub use format::EntryFormatter;
pub use http::{HttpPayload, HttpSink, HttpSinkConfig, TrustConfig, TrustContext};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SinkError};
use logrelay_common::{LogEntry, Severity};

/// A delivery target for log entries.
///
/// Implementations must not panic on delivery failure; they return a
/// [`SinkError`] and the dispatcher reports it.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in diagnostics ("console", "file", "http").
    fn name(&self) -> &str;

    /// Entries below this severity are skipped.
    fn min_level(&self) -> Severity {
        Severity::Debug
    }

    /// Deliver one entry.
    async fn deliver(&self, entry: &LogEntry) -> std::result::Result<(), SinkError>;
}

pub(crate) fn default_min_level() -> Severity {
    Severity::Debug
}

/// Configuration of every sink the relay can construct.
///
/// A sink is active when its section is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinksConfig {
    /// Render console/file timestamps in UTC instead of local time.
    #[serde(default)]
    pub utc_timestamps: bool,

    /// Console sink settings.
    #[serde(default)]
    pub console: Option<ConsoleSinkConfig>,

    /// File sink settings.
    #[serde(default)]
    pub file: Option<FileSinkConfig>,

    /// HTTP sink settings.
    #[serde(default)]
    pub http: Option<HttpSinkConfig>,
}

impl SinksConfig {
    /// Whether no sink section is present.
    pub fn is_empty(&self) -> bool {
        self.console.is_none() && self.file.is_none() && self.http.is_none()
    }

    /// Validate the sink sections that can be checked without I/O.
    pub fn validate(&self) -> Result<()> {
        if let Some(file) = &self.file {
            file.validate()?;
        }
        if let Some(http) = &self.http {
            http.validate()?;
        }
        Ok(())
    }

    /// Formatter shared by the console and file sinks.
    pub fn formatter(&self) -> EntryFormatter {
        EntryFormatter::new(self.utc_timestamps)
    }
}

/// Construct the configured sinks, in file, HTTP, console order.
///
/// Any failure here is a startup error.
pub async fn build_sinks(config: &SinksConfig) -> Result<Vec<Box<dyn Sink>>> {
    let formatter = config.formatter();
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();

    if let Some(file) = &config.file {
        let sink = FileSink::open(file, formatter).await?;
        tracing::info!(path = %file.path.display(), append = file.append, "File sink enabled");
        sinks.push(Box::new(sink));
    }

    if let Some(http) = &config.http {
        let sink = HttpSink::from_config(http)?;
        tracing::info!(url = %http.url, content_type = %http.content_type, "HTTP sink enabled");
        sinks.push(Box::new(sink));
    }

    if let Some(console) = &config.console {
        tracing::info!(stream = ?console.stream, "Console sink enabled");
        sinks.push(Box::new(ConsoleSink::from_config(console, formatter)));
    }

    Ok(sinks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sinks_config_defaults() {
        let config: SinksConfig = json5::from_str("{}").unwrap();
        assert!(config.is_empty());
        assert!(!config.utc_timestamps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sinks_config_full() {
        let config: SinksConfig = json5::from_str(
            r#"{
                utc_timestamps: true,
                console: { stream: "stdout", min_level: "info" },
                file: { path: "/tmp/relay.log", append: false },
                http: {
                    url: "http://localhost:8080/log",
                    content_type: "text/plain",
                    json_default_key: "message",
                    timeout_secs: 3,
                },
            }"#,
        )
        .unwrap();

        assert!(config.utc_timestamps);
        let console = config.console.as_ref().unwrap();
        assert_eq!(console.stream, ConsoleStream::Stdout);
        assert_eq!(console.min_level, Severity::Info);

        let file = config.file.as_ref().unwrap();
        assert!(!file.append);
        assert_eq!(file.min_level, Severity::Debug);

        let http = config.http.as_ref().unwrap();
        assert_eq!(http.content_type, "text/plain");
        assert_eq!(http.json_default_key, "message");
        assert_eq!(http.timeout_secs, 3);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_build_sinks_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = SinksConfig {
            utc_timestamps: true,
            console: Some(ConsoleSinkConfig::default()),
            file: Some(FileSinkConfig::new(dir.path().join("relay.log"))),
            http: Some(HttpSinkConfig::new("http://127.0.0.1:9/log")),
        };

        let sinks = build_sinks(&config).await.unwrap();
        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["file", "http", "console"]);
    }

    #[tokio::test]
    async fn test_build_sinks_empty() {
        let sinks = build_sinks(&SinksConfig::default()).await.unwrap();
        assert!(sinks.is_empty());
    }
}
