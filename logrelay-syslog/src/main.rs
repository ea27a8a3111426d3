//! UDP syslog relay to console, file and HTTP sinks.

use anyhow::Result;
use clap::Parser;

use logrelay_framework::RelayRunner;
use logrelay_syslog::cli::Cli;
use logrelay_syslog::config::SyslogRelayConfig;
use logrelay_syslog::{UdpListener, announce_startup};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config file first, flags on top
    let config = SyslogRelayConfig::from_cli(&cli)?;

    let mut runner = RelayRunner::new_with_args("syslog", config, Some(&cli.common))
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let listener_config = runner.config().listener.clone();
    let dispatcher = runner.dispatcher();

    announce_startup(runner.config(), &dispatcher).await;

    let listener = UdpListener::bind(&listener_config).await?;
    runner.spawn(listener.run(dispatcher));

    runner.run().await.map_err(|e| anyhow::anyhow!("{}", e))
}
