//! # discount-token
//!
//! Signed discount tokens for product links.
//!
//! This crate provides functionality for:
//! - Loading or generating the ES256 (P-256) signing keypair
//! - Building compact discount claims (price, discount, product, merchant)
//! - Signing and verifying JWS compact tokens
//! - Attaching tokens to URLs as the `pv2` query parameter and extracting them
//!
//! ## Token Layout
//!
//! | Segment | Content |
//! |---------|---------|
//! | header | `{"alg":"ES256","typ":"JWT"}` |
//! | claims | `{"c","dc","dp","m","exp","p","o","iat"}` |
//! | signature | raw `r || s`, 64 bytes |
//!
//! All three segments are base64url without padding.

pub mod claims;
pub mod clock;
pub mod error;
pub mod keys;
pub mod provider;
pub mod service;
pub mod token;
pub mod url;

pub use claims::{DiscountClaim, DiscountRequest};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::TokenError;
pub use keys::KeyPair;
pub use p256::ecdsa::VerifyingKey as PublicKey;
pub use provider::{KeySource, obtain_key_pair};
pub use service::DiscountService;
pub use token::{TokenInfo, TokenSigner, TokenVerifier, inspect_token_unverified};
