//! Relay runner for lifecycle management.

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;

use logrelay_common::{LoggingConfig, init_tracing};

use crate::RelayArgs;
use crate::config::RelayConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{RelayError, Result};
use crate::sink::build_sinks;

/// Relay runner that manages the lifecycle of a relay.
///
/// Handles:
/// - Logging initialization
/// - Sink construction and the shared [`Dispatcher`]
/// - Task spawning and management
/// - Graceful shutdown on Ctrl+C
///
/// # Example
///
/// ```ignore
/// use logrelay_framework::{RelayConfig, RelayRunner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = MyRelayConfig::load("relay.json5")?;
///     let mut runner = RelayRunner::new("myrelay", config).await?;
///
///     let dispatcher = runner.dispatcher();
///     runner.spawn(async move {
///         // Listener logic here
///     });
///
///     runner.run().await
/// }
/// ```
pub struct RelayRunner<C: RelayConfig> {
    /// Relay name for logging.
    name: String,
    /// The loaded configuration.
    config: C,
    /// Shared sink dispatcher.
    dispatcher: Arc<Dispatcher>,
    /// Spawned tasks.
    tasks: Vec<JoinHandle<()>>,
}

impl<C: RelayConfig> RelayRunner<C> {
    /// Create a new relay runner.
    ///
    /// This will:
    /// 1. Initialize logging based on config (with optional CLI override)
    /// 2. Build the configured sinks
    /// 3. Create the dispatcher
    pub async fn new(name: impl Into<String>, config: C) -> Result<Self> {
        Self::new_with_args(name, config, None).await
    }

    /// Create a new relay runner with CLI args for log level override.
    pub async fn new_with_args(
        name: impl Into<String>,
        config: C,
        args: Option<&RelayArgs>,
    ) -> Result<Self> {
        let log_config = match args.and_then(|a| a.log_level.as_ref()) {
            Some(level) => LoggingConfig {
                level: level.clone(),
                ..config.logging().clone()
            },
            None => config.logging().clone(),
        };

        init_tracing(&log_config).map_err(|e| RelayError::config(e.to_string()))?;

        let sinks = build_sinks(config.sinks()).await?;
        Ok(Self::with_dispatcher(name, config, Dispatcher::new(sinks)))
    }

    /// Create a runner around an already built dispatcher.
    ///
    /// Does not touch the global tracing subscriber.
    pub fn with_dispatcher(name: impl Into<String>, config: C, dispatcher: Dispatcher) -> Self {
        let name = name.into();

        tracing::info!(
            relay = %name,
            version = env!("CARGO_PKG_VERSION"),
            sinks = ?dispatcher.sink_names(),
            "Starting relay"
        );

        Self {
            name,
            config,
            dispatcher: Arc::new(dispatcher),
            tasks: Vec::new(),
        }
    }

    /// Get the relay name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Get a handle to the shared dispatcher.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    /// Spawn a worker task.
    ///
    /// The task will be tracked and aborted on shutdown.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.tasks.push(handle);
    }

    /// Spawn a worker task that returns a Result.
    ///
    /// Errors are logged automatically.
    pub fn spawn_with_error<F, E>(&mut self, name: String, future: F)
    where
        F: Future<Output = std::result::Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if let Err(e) = future.await {
                tracing::error!(worker = %name, error = %e, "Worker failed");
            }
        });
        self.tasks.push(handle);
    }

    /// Run the relay until Ctrl+C is received.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await
    }

    /// Run the relay until `shutdown` completes.
    ///
    /// This will:
    /// 1. Wait for the shutdown future
    /// 2. Abort all spawned tasks
    /// 3. Drop the dispatcher, closing the sinks
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            relay = %self.name,
            tasks = self.tasks.len(),
            "Relay running. Press Ctrl+C to stop."
        );

        shutdown.await;

        tracing::info!(relay = %self.name, "Received shutdown signal");

        for task in &self.tasks {
            task.abort();
        }

        // Wait briefly for tasks to clean up
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        tracing::info!(relay = %self.name, "Goodbye!");

        Ok(())
    }
}
