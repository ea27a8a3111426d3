//! UDP syslog receiver.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::UdpSocket;

use logrelay_framework::{DispatchStats, Dispatcher};

use crate::config::{ListenerConfig, SyslogRelayConfig};
use crate::parser::{self, DecodePolicy};
use crate::router;

/// A bound UDP socket feeding the dispatcher.
pub struct UdpListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
    config: ListenerConfig,
}

impl UdpListener {
    /// Bind the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self> {
        let socket = UdpSocket::bind(&config.bind)
            .await
            .with_context(|| format!("Failed to bind UDP socket to {}", config.bind))?;
        let local_addr = socket
            .local_addr()
            .context("Failed to read UDP socket address")?;

        Ok(Self {
            socket,
            local_addr,
            config: config.clone(),
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive datagrams until the task is aborted.
    ///
    /// Each datagram is fully dispatched before the next one is read.
    pub async fn run(self, dispatcher: Arc<Dispatcher>) {
        tracing::info!("UDP syslog listener started on {}", self.local_addr);

        let mut buf = vec![0u8; self.config.receive_buffer_size];
        let chunk_size = self.config.max_message_size;
        let policy = self.config.decode_policy;

        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, peer)) => {
                    tracing::debug!(peer = %peer, bytes = len, "Received datagram");
                    for chunk in buf[..len].chunks(chunk_size) {
                        process_datagram(chunk, policy, &dispatcher).await;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "UDP receive error");
                }
            }
        }
    }
}

/// Send the `Listen on: <bind>` entry to every sink, unless disabled.
pub async fn announce_startup(
    config: &SyslogRelayConfig,
    dispatcher: &Dispatcher,
) -> Option<DispatchStats> {
    if !config.announce_startup {
        return None;
    }
    let entry = router::listen_announcement(&config.listener.bind);
    Some(dispatcher.dispatch(&entry).await)
}

/// Parse, route and dispatch one chunk.
///
/// Returns `None` when the bytes were dropped by the decode policy.
pub async fn process_datagram(
    bytes: &[u8],
    policy: DecodePolicy,
    dispatcher: &Dispatcher,
) -> Option<DispatchStats> {
    let outcome = match parser::parse_datagram(bytes, policy) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::debug!(error = %e, policy = %policy, "Dropping undecodable datagram");
            return None;
        }
    };

    let entry = router::route_outcome(outcome);
    Some(dispatcher.dispatch(&entry).await)
}
