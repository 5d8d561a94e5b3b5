//! Configuration for EPC deployments.
//!
//! Configuration comes from a TOML document with per-field serde defaults,
//! then `EPC_`-prefixed environment variables applied on top. Invalid
//! environment values are collected as typed errors so all issues can be
//! reported at once rather than failing on the first.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::StatusMapping;

const ENV_PREFIX: &str = "EPC_";

/// Errors produced while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("cannot read configuration file: {0}")]
    Read(#[from] std::io::Error),

    /// Configuration document contains invalid TOML.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment variable holds a value outside the valid HTTP status range.
    #[error("Invalid status for {var}: {value} (valid: 100..=599)")]
    InvalidStatus { var: String, value: String },

    /// Environment variable holds an unknown log level.
    #[error("Invalid log level for {var}: {value}")]
    InvalidLogLevel { var: String, value: String },
}

/// Top-level EPC configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpcConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub status: StatusMapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EpcConfig {
    /// Parse a TOML configuration document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Defaults with environment overrides applied; override errors are
    /// returned alongside the usable config.
    pub fn from_env() -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let errors = config.apply_env_overrides();
        (config, errors)
    }

    /// Apply `EPC_*` environment overrides in place, collecting any invalid
    /// values. Invalid values leave the existing setting untouched.
    pub fn apply_env_overrides(&mut self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(value) = read_var("LOG_LEVEL") {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    self.general.log_level = value.to_lowercase();
                }
                _ => errors.push(ConfigError::InvalidLogLevel {
                    var: var_name("LOG_LEVEL"),
                    value,
                }),
            }
        }

        let overrides: [(&str, &mut u16); 7] = [
            ("STATUS_BAD_REQUEST", &mut self.status.bad_request),
            ("STATUS_UNAUTHORIZED", &mut self.status.unauthorized),
            ("STATUS_BAD_IMPLEMENTATION", &mut self.status.bad_implementation),
            ("STATUS_SCRIPT_COMPILE", &mut self.status.script_compile),
            ("STATUS_USER", &mut self.status.user),
            ("STATUS_OAUTH", &mut self.status.oauth),
            ("STATUS_SERVER", &mut self.status.server),
        ];
        for (name, slot) in overrides {
            let Some(value) = read_var(name) else {
                continue;
            };
            match value.parse::<u16>() {
                Ok(status) if (100..=599).contains(&status) => *slot = status,
                _ => errors.push(ConfigError::InvalidStatus {
                    var: var_name(name),
                    value,
                }),
            }
        }

        for error in &errors {
            tracing::warn!(%error, "ignoring invalid configuration override");
        }
        errors
    }
}

fn var_name(name: &str) -> String {
    format!("{ENV_PREFIX}{name}")
}

fn read_var(name: &str) -> Option<String> {
    env::var(var_name(name)).ok()
}

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}
