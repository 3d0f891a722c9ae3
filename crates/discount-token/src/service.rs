//! The discount token service.
//!
//! Construct one [`DiscountService`] at startup and share it by reference
//! (or behind an `Arc`). It owns the only keypair, never mutates after
//! construction and needs no locking.

use crate::claims::{DiscountClaim, DiscountRequest, build_claim, validate_request};
use crate::clock::{Clock, SystemClock};
use crate::error::TokenError;
use crate::keys::KeyPair;
use crate::provider::{KeySource, obtain_key_pair};
use crate::token::{TokenSigner, TokenVerifier};
use crate::url::UrlBinder;
use discount_core::{ClaimDefaults, DiscountLinkConfig};
use std::sync::Arc;

/// Issues discount tokens, binds them to URLs and verifies them.
#[derive(Debug, Clone)]
pub struct DiscountService {
    keypair: KeyPair,
    key_source: KeySource,
    defaults: ClaimDefaults,
    strict: bool,
    max_expires_in_days: u32,
    binder: UrlBinder,
    clock: Arc<dyn Clock>,
}

impl DiscountService {
    /// Build the service from configuration, loading or generating keys.
    ///
    /// The configuration is validated before any key material is touched.
    pub fn from_config(config: &DiscountLinkConfig) -> Result<Self, TokenError> {
        config.validate()?;
        let (keypair, key_source) = obtain_key_pair(&config.keys)?;
        Ok(Self::assemble(keypair, key_source, config))
    }

    /// Build the service around an existing keypair.
    pub fn new(keypair: KeyPair, config: &DiscountLinkConfig) -> Result<Self, TokenError> {
        config.validate()?;
        Ok(Self::assemble(keypair, KeySource::Loaded, config))
    }

    fn assemble(keypair: KeyPair, key_source: KeySource, config: &DiscountLinkConfig) -> Self {
        Self {
            keypair,
            key_source,
            defaults: config.defaults.clone(),
            strict: config.validation.strict,
            max_expires_in_days: config.validation.max_expires_in_days,
            binder: UrlBinder::new(config.url.replace_existing),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for issuance and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Enable or disable strict request validation.
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// How the keypair was obtained.
    pub fn key_source(&self) -> KeySource {
        self.key_source
    }

    pub fn defaults(&self) -> &ClaimDefaults {
        &self.defaults
    }

    /// Build the claim set for `request` at the current time.
    pub fn build_claim(&self, request: &DiscountRequest) -> Result<DiscountClaim, TokenError> {
        if self.strict {
            validate_request(request, &self.defaults, self.max_expires_in_days)?;
        }
        Ok(build_claim(request, &self.defaults, self.clock.timestamp()))
    }

    /// Generate a signed discount token.
    pub fn generate_token(&self, request: &DiscountRequest) -> Result<String, TokenError> {
        let claims = self.build_claim(request)?;
        TokenSigner::new(&self.keypair).sign(&claims)
    }

    /// Add a freshly signed discount token to `url`.
    pub fn add_discount_to_url(
        &self,
        url: &str,
        request: &DiscountRequest,
    ) -> Result<String, TokenError> {
        let token = self.generate_token(request)?;
        Ok(self.binder.attach(url, &token))
    }

    /// Shorthand for the common case: discount, price, lifetime and product.
    ///
    /// `None` lifetime or product fall back to the configured defaults.
    pub fn create_discount_url(
        &self,
        url: &str,
        discount_percent: f64,
        price: f64,
        expires_in_days: Option<u32>,
        product_id: Option<&str>,
    ) -> Result<String, TokenError> {
        let request = DiscountRequest {
            expires_in_days,
            product_id: product_id.map(str::to_string),
            ..DiscountRequest::new(discount_percent, price)
        };
        self.add_discount_to_url(url, &request)
    }

    /// Verify a token against this service's public key.
    pub fn verify_token(&self, token: &str) -> Result<DiscountClaim, TokenError> {
        self.verifier().verify(token)
    }

    /// Extract and verify the token carried by `url`.
    ///
    /// A URL without a `pv2` parameter yields `Ok(None)`.
    pub fn verify_url(&self, url: &str) -> Result<Option<DiscountClaim>, TokenError> {
        match self.binder.extract(url) {
            Some(token) => self.verify_token(token).map(Some),
            None => Ok(None),
        }
    }

    fn verifier(&self) -> TokenVerifier {
        TokenVerifier::new(self.keypair.public_key().clone()).with_clock(self.clock.clone())
    }
}
