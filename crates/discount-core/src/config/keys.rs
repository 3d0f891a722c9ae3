//! Signing key configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when no key material can be found at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeys {
    /// Generate an in-memory key pair. Tokens will not verify after a restart.
    #[default]
    Generate,
    /// Generate a key pair and write it to the configured key files.
    Persist,
    /// Refuse to start.
    Fail,
}

/// Configuration for the ES256 signing key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Path to the PKCS#8 PEM private key.
    #[serde(default = "default_private_key_file")]
    pub private_key_file: Option<PathBuf>,

    /// Path to the SPKI PEM public key.
    #[serde(default = "default_public_key_file")]
    pub public_key_file: Option<PathBuf>,

    /// Environment variable containing the PEM private key.
    #[serde(default)]
    pub private_key_env: Option<String>,

    /// Environment variable containing the PEM public key.
    #[serde(default)]
    pub public_key_env: Option<String>,

    /// Policy applied when either half of the key pair is unavailable.
    #[serde(default)]
    pub on_missing: MissingKeys,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            private_key_file: default_private_key_file(),
            public_key_file: default_public_key_file(),
            private_key_env: None,
            public_key_env: None,
            on_missing: MissingKeys::default(),
        }
    }
}

impl KeysConfig {
    /// Resolve the private key PEM from environment or file.
    pub fn resolve_private_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve_pem(self.private_key_env.as_deref(), self.private_key_file.as_ref())
    }

    /// Resolve the public key PEM from environment or file.
    pub fn resolve_public_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve_pem(self.public_key_env.as_deref(), self.public_key_file.as_ref())
    }
}

fn resolve_pem(env_var: Option<&str>, path: Option<&PathBuf>) -> Result<Option<String>, std::io::Error> {
    // Try environment variable first
    if let Some(env_var) = env_var {
        if let Ok(pem) = std::env::var(env_var) {
            if !pem.trim().is_empty() {
                return Ok(Some(pem));
            }
        }
    }

    if let Some(path) = path {
        if path.exists() {
            let pem = std::fs::read_to_string(path)?;
            return Ok(Some(pem));
        }
    }

    Ok(None)
}

fn default_private_key_file() -> Option<PathBuf> {
    Some(PathBuf::from(
        "./google-automated-discounts-dev-private-key.pem",
    ))
}

fn default_public_key_file() -> Option<PathBuf> {
    Some(PathBuf::from(
        "./google-automated-discounts-dev-public-key.pem",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "-----BEGIN PUBLIC KEY-----").unwrap();

        let config = KeysConfig {
            public_key_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let pem = config.resolve_public_key().unwrap().unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
    }

    #[test]
    fn test_missing_file_resolves_to_none() {
        let config = KeysConfig {
            private_key_file: Some(PathBuf::from("/nonexistent/discount-link/private.pem")),
            ..Default::default()
        };

        assert!(config.resolve_private_key().unwrap().is_none());
    }

    #[test]
    fn test_env_takes_precedence_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "from-file").unwrap();

        // SAFETY: We're in a test and controlling the environment
        unsafe {
            std::env::set_var("DISCOUNT_LINK_TEST_PRIVATE_KEY", "from-env");
        }

        let config = KeysConfig {
            private_key_file: Some(file.path().to_path_buf()),
            private_key_env: Some("DISCOUNT_LINK_TEST_PRIVATE_KEY".to_string()),
            ..Default::default()
        };

        assert_eq!(config.resolve_private_key().unwrap().as_deref(), Some("from-env"));
    }

    #[test]
    fn test_on_missing_parses_lowercase() {
        let policy: MissingKeys = serde_yaml::from_str("persist").unwrap();
        assert_eq!(policy, MissingKeys::Persist);
    }
}
