//! Configuration management for the observer registry.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Component-wise validation
mod dispatch;
mod naming;
pub use dispatch::*;
pub use naming::*;


use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Environment variable naming an optional configuration file
pub const CONFIG_PATH_ENV: &str = "OBSERVER_CONFIG_PATH";

/// Prefix of environment overrides, e.g. `OBSERVER__DISPATCH__EXECUTOR=thread`
pub const ENV_PREFIX: &str = "OBSERVER";

/// Main configuration container for an [`Observatory`](crate::Observatory).
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `OBSERVER_CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ObserverConfig {
    /// Callback dispatch and background execution
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Qualified name computation for by-name matching
    #[serde(default)]
    pub naming: NamingConfig,
}

impl ObserverConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `OBSERVER_CONFIG_PATH` (if set)
    /// 3. Environment variables with `OBSERVER__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred so that callers can keep layering overrides via
    /// `with_override_config()`. Call `validate()` before use.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("OBSERVER__DISPATCH__EXECUTOR", "thread");
    /// let cfg = ObserverConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
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

    /// Validates configuration and returns validated instance.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` from any subsystem.
    pub fn validate(self) -> Result<Self> {
        self.dispatch.validate()?;
        self.naming.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
