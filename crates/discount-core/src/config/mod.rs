//! Configuration types for discount-link.
//!
//! Configuration can be loaded from a YAML or TOML file (selected by file
//! extension). Every section is optional; an empty file yields the same
//! settings as [`DiscountLinkConfig::default`].
//!
//! # Example
//!
//! ```yaml
//! defaults:
//!   merchant_id: "103556247"
//!   expires_in_days: 14
//! keys:
//!   private_key_file: keys/private-key.pem
//!   public_key_file: keys/public-key.pem
//!   on_missing: fail
//! url:
//!   replace_existing: true
//! validation:
//!   strict: true
//! ```

pub mod defaults;
pub mod keys;

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use defaults::ClaimDefaults;
pub use keys::{KeysConfig, MissingKeys};

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV: &str = "DISCOUNT_LINK_CONFIG";

/// Complete discount-link configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscountLinkConfig {
    /// Claim defaults.
    #[serde(default)]
    pub defaults: ClaimDefaults,

    /// Signing key material.
    #[serde(default)]
    pub keys: KeysConfig,

    /// URL annotation behaviour.
    #[serde(default)]
    pub url: UrlConfig,

    /// Request validation.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// URL annotation settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UrlConfig {
    /// Replace an existing `pv2` parameter instead of appending a second one.
    #[serde(default)]
    pub replace_existing: bool,
}

/// Request validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject out-of-range requests before signing.
    #[serde(default)]
    pub strict: bool,

    /// Upper bound for `expires_in_days` in strict mode.
    #[serde(default = "default_max_expires_in_days")]
    pub max_expires_in_days: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_expires_in_days: default_max_expires_in_days(),
        }
    }
}

fn default_max_expires_in_days() -> u32 {
    365
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl DiscountLinkConfig {
    /// Load configuration from a YAML or TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let config = if path.extension().map(|e| e == "toml").unwrap_or(false) {
            Self::from_toml(&content)?
        } else {
            Self::from_yaml(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document for a struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from an explicit path, the `DISCOUNT_LINK_CONFIG`
    /// environment variable, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path(path) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Check settings that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.expires_in_days == 0 {
            return Err(ConfigError::Invalid(
                "defaults.expires_in_days must be at least 1".to_string(),
            ));
        }
        if self.validation.max_expires_in_days == 0 {
            return Err(ConfigError::Invalid(
                "validation.max_expires_in_days must be at least 1".to_string(),
            ));
        }
        if self.validation.strict
            && self.defaults.expires_in_days > self.validation.max_expires_in_days
        {
            return Err(ConfigError::Invalid(format!(
                "defaults.expires_in_days ({}) exceeds validation.max_expires_in_days ({})",
                self.defaults.expires_in_days, self.validation.max_expires_in_days
            )));
        }
        if self.keys.on_missing == MissingKeys::Persist
            && (self.keys.private_key_file.is_none() || self.keys.public_key_file.is_none())
        {
            return Err(ConfigError::Invalid(
                "keys.on_missing = persist requires both key file paths".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    env::var(CONFIG_ENV).ok().map(PathBuf::from)
}
