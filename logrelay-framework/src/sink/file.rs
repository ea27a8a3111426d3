use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use super::{EntryFormatter, Sink, default_min_level};
use crate::error::{RelayError, Result, SinkError};
use logrelay_common::{LogEntry, Severity};

/// File sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSinkConfig {
    /// Target file, created if missing.
    pub path: PathBuf,

    /// Append to an existing file; `false` truncates it at startup.
    #[serde(default = "default_true")]
    pub append: bool,

    #[serde(default = "default_min_level")]
    pub min_level: Severity,
}

fn default_true() -> bool {
    true
}

impl FileSinkConfig {
    /// Append-mode config at debug threshold.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: default_true(),
            min_level: default_min_level(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(RelayError::validation("File sink path is empty"));
        }
        Ok(())
    }
}

/// Appends one formatted line per entry to a file.
///
/// The file stays open for the lifetime of the sink.
pub struct FileSink {
    file: Mutex<BufWriter<File>>,
    formatter: EntryFormatter,
    min_level: Severity,
}

impl FileSink {
    /// Open the target file. Failure is a startup error.
    pub async fn open(config: &FileSinkConfig, formatter: EntryFormatter) -> Result<Self> {
        config.validate()?;

        let mut options = OpenOptions::new();
        options.create(true);
        if config.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let file = options.open(&config.path).await.map_err(|e| {
            RelayError::with_context(
                format!("Failed to open log file {}", config.path.display()),
                e,
            )
        })?;

        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
            formatter,
            min_level: config.min_level,
        })
    }
}

#[async_trait]
impl Sink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    async fn deliver(&self, entry: &LogEntry) -> std::result::Result<(), SinkError> {
        let mut line = self.formatter.format(entry);
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
