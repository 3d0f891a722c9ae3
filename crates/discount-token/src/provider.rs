//! Startup key resolution.

use crate::error::TokenError;
use crate::keys::KeyPair;
use discount_core::{KeysConfig, MissingKeys};

/// Where the active keypair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Both halves were read from the environment or key files.
    Loaded,
    /// Generated in memory; lost when the process exits.
    Ephemeral,
    /// Generated and written to the configured key files.
    Persisted,
}

/// Obtain the signing keypair according to `config`.
///
/// Called once at startup. Missing or unreadable material triggers the
/// `on_missing` policy; material that is present but unparsable is an error.
pub fn obtain_key_pair(config: &KeysConfig) -> Result<(KeyPair, KeySource), TokenError> {
    let private_pem = read_or_warn("private", config.resolve_private_key());
    let public_pem = read_or_warn("public", config.resolve_public_key());

    if let (Some(private_pem), Some(public_pem)) = (private_pem, public_pem) {
        let keypair = KeyPair::from_pem_pair(&private_pem, &public_pem)?;
        tracing::info!(
            private_key_file = ?config.private_key_file,
            public_key_file = ?config.public_key_file,
            "Signing keys loaded"
        );
        return Ok((keypair, KeySource::Loaded));
    }

    match config.on_missing {
        MissingKeys::Fail => Err(TokenError::KeysUnavailable(
            "private or public key not found and keys.on_missing = fail".to_string(),
        )),
        MissingKeys::Generate => {
            let keypair = KeyPair::generate()?;
            tracing::warn!(
                "Key files not found, generated an ephemeral keypair; \
                 tokens will not verify after a restart"
            );
            Ok((keypair, KeySource::Ephemeral))
        }
        MissingKeys::Persist => {
            let (Some(private_path), Some(public_path)) =
                (&config.private_key_file, &config.public_key_file)
            else {
                return Err(TokenError::KeysUnavailable(
                    "keys.on_missing = persist requires both key file paths".to_string(),
                ));
            };

            let keypair = KeyPair::generate()?;
            keypair.save_to_files(private_path, public_path)?;
            tracing::info!(
                private_key_file = %private_path.display(),
                public_key_file = %public_path.display(),
                "Generated and saved new signing keys"
            );
            Ok((keypair, KeySource::Persisted))
        }
    }
}

fn read_or_warn(which: &str, resolved: Result<Option<String>, std::io::Error>) -> Option<String> {
    match resolved {
        Ok(pem) => pem,
        Err(e) => {
            tracing::warn!(key = which, error = %e, "Failed to read key material");
            None
        }
    }
}
