//! Error types for discount token operations.

use thiserror::Error;

/// Errors that can occur while managing keys, issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Failed to generate keypair.
    #[error("failed to generate keypair: {0}")]
    KeyGenerationFailed(String),

    /// No key material was found and the configuration forbids generating it.
    #[error("signing keys unavailable: {0}")]
    KeysUnavailable(String),

    /// Failed to parse private key.
    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// Failed to parse public key.
    #[error("failed to parse public key: {0}")]
    InvalidPublicKey(String),

    /// The configured public key does not belong to the private key.
    #[error("public key does not match private key")]
    KeyMismatch,

    /// A discount request field failed strict validation.
    #[error("invalid {field}: {reason}")]
    InvalidClaim { field: &'static str, reason: String },

    /// Token signature does not match its header and claims.
    #[error("token verification failed: invalid signature")]
    SignatureInvalid,

    /// Token has expired.
    #[error("token verification failed: token expired at {expired_at}")]
    TokenExpired { expired_at: String },

    /// Token is not a well-formed ES256 token.
    #[error("token verification failed: malformed token: {0}")]
    TokenMalformed(String),

    /// Failed to serialize the token header or claims.
    #[error("token serialization error: {0}")]
    Serialization(String),

    /// The service configuration is inconsistent.
    #[error(transparent)]
    Config(#[from] discount_core::ConfigError),

    /// IO error (reading/writing keys).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TokenError {
    /// Whether this error was raised while verifying a token.
    ///
    /// Presentation layers can use this to show a single generic message
    /// while tests still match on the precise variant.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            TokenError::SignatureInvalid
                | TokenError::TokenExpired { .. }
                | TokenError::TokenMalformed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_grouping() {
        assert!(TokenError::SignatureInvalid.is_verification_failure());
        assert!(TokenError::TokenMalformed("x".into()).is_verification_failure());
        assert!(
            TokenError::TokenExpired {
                expired_at: "2024-01-01T00:00:00Z".into()
            }
            .is_verification_failure()
        );
        assert!(!TokenError::KeyMismatch.is_verification_failure());
    }

    #[test]
    fn test_messages_are_descriptive() {
        let err = TokenError::InvalidClaim {
            field: "price",
            reason: "must be greater than 0".into(),
        };
        assert_eq!(err.to_string(), "invalid price: must be greater than 0");
    }
}
