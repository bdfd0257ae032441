//! Configuration management for the cluster harness.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Section-wise validation
mod bootstrap;
mod build_args;
mod retry;
mod router;
mod transport;
pub use bootstrap::*;
pub use build_args::*;
pub use retry::*;
pub use router::*;
pub use transport::*;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod transport_test;

use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for the harness
///
/// Combines all section configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables with `CARTRIDGE__` prefix (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct HarnessConfig {
    /// Router endpoint, credentials and port publishing
    #[serde(default)]
    pub router: RouterConfig,
    /// Transport security and remote call limits
    #[serde(default)]
    pub transport: TransportSettings,
    /// Bootstrap timeouts, polling and probe expressions
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Retry policies for bootstrap stages
    #[serde(default)]
    pub retry: RetryPolicies,
}

impl Debug for HarnessConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("router", &self.router)
            .field("transport", &self.transport.transport())
            .field("bootstrap", &self.bootstrap)
            .field("retry", &self.retry)
            .finish()
    }
}

impl HarnessConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `CARTRIDGE__` prefix (highest priority)
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CARTRIDGE__BOOTSTRAP__PROFILE", "enterprise");
    /// let cfg = HarnessConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.router.validate()?;
        self.transport.validate()?;
        self.bootstrap.validate()?;
        self.retry.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("CARTRIDGE")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
