use std::io::Write;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{EntryFormatter, Sink, default_min_level};
use crate::error::SinkError;
use logrelay_common::{LogEntry, Severity};

/// Standard stream written by the console sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    Stdout,
    #[default]
    Stderr,
}

/// Console sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSinkConfig {
    #[serde(default)]
    pub stream: ConsoleStream,

    #[serde(default = "default_min_level")]
    pub min_level: Severity,
}

impl Default for ConsoleSinkConfig {
    fn default() -> Self {
        Self {
            stream: ConsoleStream::default(),
            min_level: default_min_level(),
        }
    }
}

/// Writes each entry as one formatted line to a standard stream.
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    formatter: EntryFormatter,
    min_level: Severity,
}

impl ConsoleSink {
    pub fn from_config(config: &ConsoleSinkConfig, formatter: EntryFormatter) -> Self {
        let writer: Box<dyn Write + Send> = match config.stream {
            ConsoleStream::Stdout => Box::new(std::io::stdout()),
            ConsoleStream::Stderr => Box::new(std::io::stderr()),
        };
        Self {
            writer: Mutex::new(writer),
            formatter,
            min_level: config.min_level,
        }
    }

    /// Console sink on stderr at debug threshold.
    pub fn stderr() -> Self {
        Self::from_config(&ConsoleSinkConfig::default(), EntryFormatter::default())
    }

    /// Console sink over an arbitrary writer.
    pub fn with_writer(
        writer: impl Write + Send + 'static,
        formatter: EntryFormatter,
        min_level: Severity,
    ) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            formatter,
            min_level,
        }
    }
}

#[async_trait]
impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    async fn deliver(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let line = self.formatter.format(entry);
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}
