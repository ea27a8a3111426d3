//! Command line interface.

use std::path::PathBuf;

use clap::Parser;
use logrelay_framework::RelayArgs;

use crate::parser::DecodePolicy;

/// UDP syslog relay.
///
/// Flags override the matching values of the configuration file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "logrelay-syslog", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub common: RelayArgs,

    /// Address to listen on [default: 0.0.0.0]
    #[arg(short = 's', long)]
    pub server_addr: Option<String>,

    /// UDP port to listen on [default: 8514]
    #[arg(short = 'p', long)]
    pub server_port: Option<u16>,

    /// Handling of datagrams that are not valid UTF-8 [default: replace]
    #[arg(long, value_enum)]
    pub decode: Option<DecodePolicy>,

    /// Append every entry to this file
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file_handler: Option<PathBuf>,

    /// POST every entry to this URL
    #[arg(short = 'H', long, value_name = "URL")]
    pub http_handler: Option<String>,

    /// PEM bundle of CA certificates trusted by the HTTP sink
    #[arg(long, value_name = "PATH")]
    pub ca_file: Option<PathBuf>,

    /// Trust the built-in web PKI roots for the HTTP sink
    #[arg(long)]
    pub builtin_roots: bool,

    /// Also print every entry to the console
    #[arg(short, long)]
    pub debug: bool,
}
