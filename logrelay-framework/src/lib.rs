//! logrelay Framework
//!
//! Output side and lifecycle management shared by logrelay listeners.
//!
//! # Overview
//!
//! This framework provides:
//! - [`Sink`] trait and the built-in [`ConsoleSink`], [`FileSink`] and [`HttpSink`]
//! - [`Dispatcher`] for fanning a [`LogEntry`] out to every active sink
//! - [`RelayConfig`] trait for configuration loading and validation
//! - [`RelayRunner`] for managing relay lifecycle (startup, shutdown, signal handling)
//! - [`RelayArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use logrelay_framework::{RelayArgs, RelayConfig, RelayRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MyRelayConfig::load("relay.json5")?;
//!     let mut runner = RelayRunner::new("myrelay", config).await?;
//!
//!     let dispatcher = runner.dispatcher();
//!     runner.spawn(my_listener(dispatcher));
//!
//!     // Run until Ctrl+C
//!     runner.run().await
//! }
//! ```

mod args;
mod config;
mod dispatcher;
mod error;
mod runner;
pub mod sink;

pub use args::RelayArgs;
pub use config::RelayConfig;
pub use dispatcher::{DispatchStats, Dispatcher};
pub use error::{RelayError, Result, SinkError};
pub use runner::RelayRunner;
pub use sink::{
    ConsoleSink, ConsoleSinkConfig, ConsoleStream, EntryFormatter, FileSink, FileSinkConfig,
    HttpPayload, HttpSink, HttpSinkConfig, Sink, SinksConfig, TrustConfig, TrustContext,
    build_sinks,
};

// Re-export commonly used types from logrelay-common
pub use logrelay_common::{LogEntry, LogFormat, LoggingConfig, Severity};
