//! Priority-prefixed syslog line parser (`<N>message`).

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// <PRI>MSG, anchored at the start; MSG stops at the first line break.
static LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<([0-9]+)>(.*)").unwrap());

/// How invalid UTF-8 in a datagram is handled.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Drop invalid bytes.
    Ignore,
    /// Reject the datagram.
    Strict,
    /// Substitute U+FFFD for invalid sequences.
    #[default]
    Replace,
}

impl DecodePolicy {
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, DecodeError> {
        match self {
            DecodePolicy::Strict => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| DecodeError {
                    valid_up_to: e.valid_up_to(),
                }),
            DecodePolicy::Replace => Ok(String::from_utf8_lossy(bytes)),
            DecodePolicy::Ignore => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(Cow::Borrowed(text)),
                Err(_) => Ok(Cow::Owned(
                    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect(),
                )),
            },
        }
    }
}

impl std::fmt::Display for DecodePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Strict => write!(f, "strict"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// The datagram is not valid UTF-8 under the strict policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid UTF-8 after {valid_up_to} bytes")]
pub struct DecodeError {
    pub valid_up_to: usize,
}

/// The text does not match `<digits>message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a priority-prefixed line: {raw:?}")]
pub struct ParseFailure {
    /// The decoded text, unchanged.
    pub raw: String,
}

/// A successfully parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub priority: u64,
    pub body: String,
}

/// Parse decoded text.
pub fn parse_line(text: &str) -> Result<ParsedLine, ParseFailure> {
    let failure = || ParseFailure {
        raw: text.to_string(),
    };

    let caps = LINE_REGEX.captures(text).ok_or_else(failure)?;
    let priority: u64 = caps[1].parse().map_err(|_| failure())?;

    let body = &caps[2];
    let body = body.strip_suffix('\0').unwrap_or(body);

    Ok(ParsedLine {
        priority,
        body: body.to_string(),
    })
}

/// Decode and parse one datagram.
///
/// The outer error means the datagram is dropped; the inner one is a
/// malformed line that is still reported downstream.
pub fn parse_datagram(
    bytes: &[u8],
    policy: DecodePolicy,
) -> Result<Result<ParsedLine, ParseFailure>, DecodeError> {
    let text = policy.decode(bytes)?;
    Ok(parse_line(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let parsed = parse_line("<14>service started").unwrap();
        assert_eq!(parsed.priority, 14);
        assert_eq!(parsed.body, "service started");
    }

    #[test]
    fn test_parse_strips_single_trailing_nul() {
        assert_eq!(parse_line("<11>disk failure\0").unwrap().body, "disk failure");
        assert_eq!(parse_line("<11>two nuls\0\0").unwrap().body, "two nuls\0");
    }

    #[test]
    fn test_parse_empty_body() {
        let parsed = parse_line("<14>").unwrap();
        assert_eq!(parsed.priority, 14);
        assert_eq!(parsed.body, "");

        assert_eq!(parse_line("<14>\0").unwrap().body, "");
    }

    #[test]
    fn test_parse_stops_at_line_break() {
        let parsed = parse_line("<12>first line\nsecond line").unwrap();
        assert_eq!(parsed.body, "first line");

        let parsed = parse_line("<12>with nul\0\n").unwrap();
        assert_eq!(parsed.body, "with nul");
    }

    #[test]
    fn test_parse_leading_zeros() {
        assert_eq!(parse_line("<013>x").unwrap().priority, 13);
    }

    #[test]
    fn test_parse_failures() {
        for raw in [
            "garbage-no-prefix",
            "<>empty priority",
            "<abc>letters",
            " <14>leading space",
            "<14 unterminated",
            "",
        ] {
            let failure = parse_line(raw).unwrap_err();
            assert_eq!(failure.raw, raw);
        }
    }

    #[test]
    fn test_parse_priority_overflow() {
        let raw = "<99999999999999999999999>too big";
        assert_eq!(parse_line(raw).unwrap_err().raw, raw);
    }

    #[test]
    fn test_decode_strict() {
        assert_eq!(
            DecodePolicy::Strict.decode(b"<14>ok").unwrap(),
            Cow::Borrowed("<14>ok")
        );
        let err = DecodePolicy::Strict.decode(b"<14>bad \xff byte").unwrap_err();
        assert_eq!(err.valid_up_to, 8);
    }

    #[test]
    fn test_decode_replace() {
        let text = DecodePolicy::Replace.decode(b"<14>bad \xff byte").unwrap();
        assert_eq!(text, "<14>bad \u{FFFD} byte");
    }

    #[test]
    fn test_decode_ignore() {
        let text = DecodePolicy::Ignore.decode(b"<14>bad \xff\xfe byte").unwrap();
        assert_eq!(text, "<14>bad  byte");
    }

    #[test]
    fn test_parse_datagram_strict_drops() {
        assert!(parse_datagram(b"<14>\xc3\x28", DecodePolicy::Strict).is_err());
    }

    #[test]
    fn test_parse_datagram_replace_still_parses() {
        let line = parse_datagram(b"<14>caf\xe9", DecodePolicy::Replace)
            .unwrap()
            .unwrap();
        assert_eq!(line.body, "caf\u{FFFD}");

        let failure = parse_datagram(b"\xff<14>x", DecodePolicy::Replace)
            .unwrap()
            .unwrap_err();
        assert_eq!(failure.raw, "\u{FFFD}<14>x");
    }

    #[test]
    fn test_parse_datagram_ignore_can_repair_prefix() {
        let line = parse_datagram(b"\xff<14>x", DecodePolicy::Ignore)
            .unwrap()
            .unwrap();
        assert_eq!(line.priority, 14);
    }

    #[test]
    fn test_decode_policy_serde() {
        let policy: DecodePolicy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(policy, DecodePolicy::Strict);
        assert_eq!(DecodePolicy::default(), DecodePolicy::Replace);
        assert_eq!(DecodePolicy::Ignore.to_string(), "ignore");
    }
}
