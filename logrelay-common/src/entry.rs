use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized log entry, ready to be handed to every active sink.
///
/// Entries are never mutated after construction; sinks receive `&LogEntry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Normalized severity.
    pub severity: Severity,

    /// Message text.
    pub message: String,

    /// When the entry was created.
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Replace the timestamp of this entry.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Normalized log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
    #[serde(alias = "critical")]
    Fatal,
    /// A priority with no entry in the severity table.
    Unknown(u64),
}

impl Severity {
    /// Level name as written by the console and file sinks.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "CRITICAL",
            Severity::Unknown(_) => "UNKNOWN",
        }
    }

    /// Numeric rank used for threshold comparisons.
    ///
    /// `Unknown` ranks as `Info`.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Debug => 10,
            Severity::Info | Severity::Unknown(_) => 20,
            Severity::Warning => 30,
            Severity::Error => 40,
            Severity::Fatal => 50,
        }
    }

    /// Severity for a raw syslog priority value.
    ///
    /// Only the whole priority is looked up; facility bits are not split out.
    pub fn from_priority(priority: u64) -> Self {
        match priority {
            15 => Severity::Debug,
            14 => Severity::Info,
            12 => Severity::Warning,
            11 => Severity::Error,
            10 => Severity::Fatal,
            other => Severity::Unknown(other),
        }
    }

    /// Whether this severity passes the given threshold.
    pub fn is_at_least(&self, threshold: Severity) -> bool {
        self.rank() >= threshold.rank()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let before = Utc::now();
        let entry = LogEntry::new(Severity::Warning, "disk almost full");

        assert_eq!(entry.severity, Severity::Warning);
        assert_eq!(entry.message, "disk almost full");
        assert!(entry.timestamp >= before);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(Severity::Debug.as_str(), "DEBUG");
        assert_eq!(Severity::Info.to_string(), "INFO");
        assert_eq!(Severity::Fatal.to_string(), "CRITICAL");
        assert_eq!(Severity::Unknown(13).to_string(), "UNKNOWN");
    }

    #[test]
    fn test_threshold() {
        assert!(Severity::Error.is_at_least(Severity::Warning));
        assert!(Severity::Debug.is_at_least(Severity::Debug));
        assert!(!Severity::Debug.is_at_least(Severity::Info));
        assert!(Severity::Unknown(99).is_at_least(Severity::Info));
        assert!(!Severity::Unknown(99).is_at_least(Severity::Warning));
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");

        let parsed: Severity = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(parsed, Severity::Warning);

        let unknown = serde_json::to_string(&Severity::Unknown(13)).unwrap();
        assert_eq!(unknown, r#"{"unknown":13}"#);
    }

    #[test]
    fn test_from_priority() {
        assert_eq!(Severity::from_priority(10), Severity::Fatal);
        assert_eq!(Severity::from_priority(15), Severity::Debug);
        assert_eq!(Severity::from_priority(16), Severity::Unknown(16));
        assert_eq!(Severity::from_priority(13).rank(), Severity::Info.rank());
    }
}
