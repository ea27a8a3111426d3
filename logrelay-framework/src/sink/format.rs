use chrono::Local;

use logrelay_common::LogEntry;

/// `YYYY-MM-DDTHH:MM:SS.mmm`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Line formatter shared by the console and file sinks.
///
/// Produces `timestamp.millis: LEVEL: message`, without a line terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFormatter {
    utc: bool,
}

impl EntryFormatter {
    pub fn new(utc: bool) -> Self {
        Self { utc }
    }

    /// A formatter rendering timestamps in UTC.
    pub fn utc() -> Self {
        Self { utc: true }
    }

    pub fn format(&self, entry: &LogEntry) -> String {
        let timestamp = if self.utc {
            entry.timestamp.format(TIMESTAMP_FORMAT).to_string()
        } else {
            entry
                .timestamp
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT)
                .to_string()
        };

        format!("{}: {}: {}", timestamp, entry.severity, entry.message)
    }
}
