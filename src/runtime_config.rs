//! # Runtime Configuration
//!
//! Settings are layered with the `config` crate, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional file (`--config`; YAML, TOML or JSON by extension)
//! 3. environment variables `SROUTE_<SECTION>__<KEY>`, e.g.
//!    `SROUTE_SERVER__ADDR=0.0.0.0:8080` or `SROUTE_LOGGING__FORMAT=json`
//! 4. command-line flags
//!
//! ## Stack size
//!
//! `server.stack_size` sets the coroutine stack size in bytes. It accepts a
//! number or a string in decimal or `0x` hex (`"0x8000"`). Default: `0x8000`.
//!
//! ```rust
//! use schemaroute::runtime_config::AppConfig;
//!
//! let config = AppConfig::default();
//! assert_eq!(config.server.addr, "127.0.0.1:8000");
//! assert_eq!(config.server.stack_size, 0x8000);
//! ```

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::debug;

use crate::handlers::Variant;
use crate::logging::LogConfig;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "SROUTE";

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_STACK_SIZE: usize = 0x8000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    #[serde(deserialize_with = "deserialize_stack_size")]
    pub stack_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub variant: Variant,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub routes: RoutesConfig,
    pub logging: LogConfig,
}

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub addr: Option<String>,
    pub variant: Option<Variant>,
    pub log_level: Option<String>,
}

/// Parse a stack size written as decimal (`32768`) or hex (`0x8000`).
#[must_use]
pub fn parse_stack_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

fn deserialize_stack_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => usize::try_from(n).map_err(serde::de::Error::custom),
        Raw::Text(s) => parse_stack_size(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid stack size '{s}'"))),
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the process environment.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or parsed, or a value has the wrong type.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(file, overrides, Environment::with_prefix(ENV_PREFIX))
    }

    /// Like [`load`](Self::load) with an explicit environment source; tests pass
    /// `Environment::source` to avoid touching process variables.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or parsed, or a value has the wrong type.
    pub fn load_with_env(
        file: Option<&Path>,
        overrides: &Overrides,
        environment: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            environment
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: AppConfig = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        let config = loaded.with_overrides(overrides);
        debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(addr) = &overrides.addr {
            self.server.addr.clone_from(addr);
        }
        if let Some(variant) = overrides.variant {
            self.routes.variant = variant;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level.clone_from(level);
        }
        self
    }
}
