//! Syslog relay configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use logrelay_framework::{
    ConsoleSinkConfig, FileSinkConfig, HttpSinkConfig, LoggingConfig, RelayConfig, RelayError,
    SinksConfig, TrustConfig,
};

use crate::cli::Cli;
use crate::parser::DecodePolicy;

/// Complete syslog relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyslogRelayConfig {
    /// UDP listener settings.
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Output sinks.
    #[serde(default)]
    pub sinks: SinksConfig,

    /// Send a `Listen on: <addr>` entry to every sink before serving.
    #[serde(default = "default_true")]
    pub announce_startup: bool,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// UDP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Bind address, e.g. "0.0.0.0:8514".
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Datagrams are processed in chunks of this many bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Size of the receive buffer; longer datagrams are truncated.
    #[serde(default = "default_receive_buffer_size")]
    pub receive_buffer_size: usize,

    /// Handling of invalid UTF-8.
    #[serde(default)]
    pub decode_policy: DecodePolicy,
}

fn default_bind() -> String {
    "0.0.0.0:8514".to_string()
}

fn default_max_message_size() -> usize {
    512
}

fn default_receive_buffer_size() -> usize {
    65535
}

fn default_true() -> bool {
    true
}

impl Default for SyslogRelayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            sinks: SinksConfig::default(),
            announce_startup: default_true(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_message_size: default_max_message_size(),
            receive_buffer_size: default_receive_buffer_size(),
            decode_policy: DecodePolicy::default(),
        }
    }
}

/// Split "host:port" (or "[v6]:port") into its parts.
fn split_bind(bind: &str) -> Option<(&str, u16)> {
    let (host, port) = bind.rsplit_once(':')?;
    let port = port.parse().ok()?;
    Some((host, port))
}

fn join_bind(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

impl SyslogRelayConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        <Self as RelayConfig>::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }

    /// Build the configuration from the command line: the optional config
    /// file first, then the flags on top.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.common.config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate_config()?;
        Ok(config)
    }

    /// Apply command line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.server_addr.is_some() || cli.server_port.is_some() {
            let (host, port) = split_bind(&self.listener.bind).unwrap_or(("0.0.0.0", 8514));
            let host = cli.server_addr.as_deref().unwrap_or(host);
            let port = cli.server_port.unwrap_or(port);
            self.listener.bind = join_bind(host, port);
        }

        if let Some(policy) = cli.decode {
            self.listener.decode_policy = policy;
        }

        if let Some(path) = &cli.file_handler {
            let file = self
                .sinks
                .file
                .get_or_insert_with(|| FileSinkConfig::new(path));
            file.path = path.clone();
        }

        if let Some(url) = &cli.http_handler {
            let http = self
                .sinks
                .http
                .get_or_insert_with(|| HttpSinkConfig::new(url.as_str()));
            http.url = url.clone();
        }

        if cli.ca_file.is_some() || cli.builtin_roots {
            if let Some(http) = self.sinks.http.as_mut() {
                let trust = http.trust.get_or_insert_with(TrustConfig::default);
                if let Some(ca_file) = &cli.ca_file {
                    trust.ca_file = Some(ca_file.clone());
                }
                if cli.builtin_roots {
                    trust.builtin_roots = true;
                }
            }
        }

        let needs_console =
            cli.debug || (self.sinks.file.is_none() && self.sinks.http.is_none());
        if needs_console && self.sinks.console.is_none() {
            self.sinks.console = Some(ConsoleSinkConfig::default());
        }
    }

    /// Validate the configuration.
    pub fn validate_config(&self) -> anyhow::Result<()> {
        let listener = &self.listener;

        if listener.bind.is_empty() {
            anyhow::bail!("Listener has empty bind address");
        }
        if split_bind(&listener.bind).is_none() {
            anyhow::bail!(
                "Listener bind address must include port (e.g., '0.0.0.0:8514'), got '{}'",
                listener.bind
            );
        }
        if listener.max_message_size == 0 {
            anyhow::bail!("max_message_size must be greater than 0");
        }
        if listener.max_message_size > listener.receive_buffer_size {
            anyhow::bail!(
                "max_message_size ({}) must not exceed receive_buffer_size ({})",
                listener.max_message_size,
                listener.receive_buffer_size
            );
        }

        self.sinks.validate()?;

        Ok(())
    }
}

impl RelayConfig for SyslogRelayConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn sinks(&self) -> &SinksConfig {
        &self.sinks
    }

    fn validate(&self) -> logrelay_framework::Result<()> {
        self.validate_config()
            .map_err(|e| RelayError::validation(e.to_string()))
    }
}
