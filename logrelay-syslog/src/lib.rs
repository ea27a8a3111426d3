//! UDP syslog relay.
//!
//! Receives priority-prefixed lines (`<N>message`) over UDP and forwards
//! each one to the configured sinks.
//!
//! # Severity Mapping
//!
//! | Priority | Severity |
//! |----------|----------|
//! | 15       | DEBUG    |
//! | 14       | INFO     |
//! | 12       | WARNING  |
//! | 11       | ERROR    |
//! | 10       | CRITICAL |
//!
//! Any other priority is logged at INFO with the `<N>` prefix kept in the
//! message. Lines without a priority prefix are logged at ERROR as
//! `SYSLOG ERROR: <raw text>`.

pub mod cli;
pub mod config;
pub mod parser;
pub mod receiver;
pub mod router;

pub use config::{ListenerConfig, SyslogRelayConfig};
pub use receiver::{UdpListener, announce_startup, process_datagram};
