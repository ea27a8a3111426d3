//! CLI argument parsing shared by relays.

use std::path::PathBuf;

use clap::Args;

/// Common CLI arguments, meant to be flattened into a relay's own parser.
#[derive(Args, Debug, Clone, Default)]
pub struct RelayArgs {
    /// Path to a JSON5 configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}
