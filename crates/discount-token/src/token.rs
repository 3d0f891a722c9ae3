//! Token creation and verification.
//!
//! Tokens use the JWS compact serialization:
//! `base64url(header).base64url(claims).base64url(signature)`, where the
//! signature is the raw 64-byte `r || s` ES256 signature over the first two
//! segments.

use crate::claims::DiscountClaim;
use crate::clock::{Clock, SystemClock};
use crate::error::TokenError;
use crate::keys::KeyPair;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The only accepted signing algorithm.
pub const ALGORITHM: &str = "ES256";

/// Token type declared in the header.
pub const TOKEN_TYPE: &str = "JWT";

/// JOSE header of a discount token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl Header {
    fn es256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        }
    }
}

/// Signs discount claims with the private key.
#[derive(Clone)]
pub struct TokenSigner {
    signing_key: SigningKey,
}

impl TokenSigner {
    /// Create a new token signer with the given keypair.
    pub fn new(keypair: &KeyPair) -> Self {
        Self {
            signing_key: keypair.signing_key().clone(),
        }
    }

    /// Serialize and sign `claims` into a compact token.
    pub fn sign(&self, claims: &DiscountClaim) -> Result<String, TokenError> {
        let header = serde_json::to_vec(&Header::es256())
            .map_err(|e| TokenError::Serialization(e.to_string()))?;
        let payload =
            serde_json::to_vec(claims).map_err(|e| TokenError::Serialization(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature: Signature = self.signing_key.sign(signing_input.as_bytes());

        tracing::debug!(
            product_id = %claims.product_id,
            expires_at = claims.expires_at,
            "Discount token signed"
        );

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }
}

/// Verifier for discount tokens.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    public_key: VerifyingKey,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Create a new token verifier with the given public key.
    pub fn new(public_key: VerifyingKey) -> Self {
        Self {
            public_key,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Verify a token and extract its claims.
    ///
    /// Checks, in order: structure, declared algorithm, signature, claim
    /// encoding, expiry.
    pub fn verify(&self, token: &str) -> Result<DiscountClaim, TokenError> {
        let token = token.trim();
        let [header_b64, claims_b64, signature_b64] = split_token(token)?;

        let header: Header = decode_segment(header_b64, "header")?;
        if header.alg != ALGORITHM {
            return Err(TokenError::TokenMalformed(format!(
                "unexpected algorithm '{}', expected {ALGORITHM}",
                header.alg
            )));
        }

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::TokenMalformed("signature is not base64url".to_string()))?;
        let signature = Signature::from_slice(&signature_bytes).map_err(|_| {
            TokenError::TokenMalformed(format!(
                "signature must be 64 bytes, found {}",
                signature_bytes.len()
            ))
        })?;

        let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
        self.public_key
            .verify(signing_input.as_bytes(), &signature)
            .map_err(|_| TokenError::SignatureInvalid)?;

        let claims: DiscountClaim = decode_segment(claims_b64, "claims")?;

        let now = self.clock.timestamp();
        if claims.is_expired_at(now) {
            let expired_at = claims
                .expires_at_utc()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| claims.expires_at.to_string());
            return Err(TokenError::TokenExpired { expired_at });
        }

        tracing::debug!(product_id = %claims.product_id, "Discount token verified");
        Ok(claims)
    }
}

fn split_token(token: &str) -> Result<[&str; 3], TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.as_slice() {
        [header, claims, signature]
            if !header.is_empty() && !claims.is_empty() && !signature.is_empty() =>
        {
            Ok([*header, *claims, *signature])
        }
        [_, _, _] => Err(TokenError::TokenMalformed(
            "token has an empty segment".to_string(),
        )),
        _ => Err(TokenError::TokenMalformed(format!(
            "expected 3 segments, found {}",
            parts.len()
        ))),
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::TokenMalformed(format!("{what} is not base64url")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::TokenMalformed(format!("invalid {what}: {e}")))
}

/// Inspect a token without verification (for debugging).
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, TokenError> {
    let [header_b64, claims_b64, _] = split_token(token.trim())?;

    Ok(TokenInfo {
        header: decode_segment(header_b64, "header")?,
        claims: decode_segment(claims_b64, "claims")?,
    })
}

/// Information about a token (for inspection).
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// Decoded header.
    pub header: Header,
    /// Decoded, unverified claims.
    pub claims: DiscountClaim,
}
