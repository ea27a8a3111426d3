//! Configuration traits and utilities.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::LoggingConfig;
use crate::error::{RelayError, Result};
use crate::sink::SinksConfig;

/// Trait for relay configuration types.
///
/// Implement this trait for your relay's configuration struct to get
/// automatic loading, validation, and access to common config fields.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use logrelay_framework::{RelayConfig, LoggingConfig, SinksConfig};
///
/// #[derive(Debug, Deserialize)]
/// pub struct MyRelayConfig {
///     pub logging: LoggingConfig,
///     pub sinks: SinksConfig,
///     pub listener: MyListenerConfig,
/// }
///
/// impl RelayConfig for MyRelayConfig {
///     fn logging(&self) -> &LoggingConfig {
///         &self.logging
///     }
///
///     fn sinks(&self) -> &SinksConfig {
///         &self.sinks
///     }
/// }
/// ```
pub trait RelayConfig: Sized + DeserializeOwned {
    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Get the sink configuration.
    fn sinks(&self) -> &SinksConfig;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. The default checks the sinks.
    fn validate(&self) -> Result<()> {
        self.sinks().validate()
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RelayError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }
}
