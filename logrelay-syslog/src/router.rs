//! Mapping of parsed lines to normalized log entries.

use logrelay_common::{LogEntry, Severity};

use crate::parser::{ParseFailure, ParsedLine};

/// Prefix of the message emitted for an unparseable line.
pub const PARSE_ERROR_PREFIX: &str = "SYSLOG ERROR: ";

/// Turn a parsed line into the entry handed to the sinks.
///
/// Priorities missing from the table are kept in the message as `<N>`
/// and logged at info.
pub fn route(line: ParsedLine) -> LogEntry {
    match Severity::from_priority(line.priority) {
        Severity::Unknown(priority) => {
            LogEntry::new(Severity::Info, format!("<{}>{}", priority, line.body))
        }
        severity => LogEntry::new(severity, line.body),
    }
}

/// Entry reported for a line that could not be parsed.
pub fn route_failure(failure: ParseFailure) -> LogEntry {
    LogEntry::new(
        Severity::Error,
        format!("{}{}", PARSE_ERROR_PREFIX, failure.raw),
    )
}

/// Entry announcing the listen address at startup.
pub fn listen_announcement(bind: &str) -> LogEntry {
    LogEntry::new(Severity::Info, format!("Listen on: {}", bind))
}

/// Route either outcome of [`crate::parser::parse_line`].
pub fn route_outcome(outcome: Result<ParsedLine, ParseFailure>) -> LogEntry {
    match outcome {
        Ok(line) => route(line),
        Err(failure) => route_failure(failure),
    }
}
