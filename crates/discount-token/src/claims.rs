//! Discount claims and the request they are built from.
//!
//! The wire names (`c`, `dc`, `dp`, `m`, `exp`, `p`, `o`, `iat`) and their
//! order are shared with every consumer of already issued tokens and must not
//! change.

use crate::error::TokenError;
use chrono::{DateTime, Utc};
use discount_core::ClaimDefaults;
use serde::{Deserialize, Serialize};

/// Seconds per day of token lifetime.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// The signed payload of a discount token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountClaim {
    /// Pricing currency.
    #[serde(rename = "c")]
    pub currency: String,

    /// Promotional code identifier.
    #[serde(rename = "dc")]
    pub discount_code: String,

    /// Discount percentage, 0 for none.
    #[serde(rename = "dp", with = "js_number")]
    pub discount_percent: f64,

    /// Merchant identifier.
    #[serde(rename = "m")]
    pub merchant_id: String,

    /// Expiry, Unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,

    /// Item price in `currency`.
    #[serde(rename = "p", with = "js_number")]
    pub price: f64,

    /// Catalog product identifier.
    #[serde(rename = "o")]
    pub product_id: String,

    /// Issue time, Unix seconds.
    #[serde(rename = "iat")]
    pub issued_at: i64,
}

impl DiscountClaim {
    /// Token lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.expires_at - self.issued_at
    }

    /// Whether the claim is expired at `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.issued_at, 0)
    }
}

/// Inputs for a new discount token. Unset fields fall back to [`ClaimDefaults`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountRequest {
    pub discount_percent: f64,
    pub price: f64,
    pub product_id: Option<String>,
    pub merchant_id: Option<String>,
    pub currency: Option<String>,
    pub discount_code: Option<String>,
    pub expires_in_days: Option<u32>,
}

impl DiscountRequest {
    /// Create a request with the two required values.
    pub fn new(discount_percent: f64, price: f64) -> Self {
        Self {
            discount_percent,
            price,
            ..Default::default()
        }
    }

    pub fn product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn merchant_id(mut self, merchant_id: impl Into<String>) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn discount_code(mut self, discount_code: impl Into<String>) -> Self {
        self.discount_code = Some(discount_code.into());
        self
    }

    pub fn expires_in_days(mut self, days: u32) -> Self {
        self.expires_in_days = Some(days);
        self
    }

    /// Lifetime after defaults are applied. Zero counts as unset.
    pub fn resolved_days(&self, defaults: &ClaimDefaults) -> u32 {
        self.expires_in_days
            .filter(|days| *days > 0)
            .unwrap_or(defaults.expires_in_days)
    }
}

/// Build the claim set for `request` issued at `now` (Unix seconds).
///
/// Empty string overrides fall back to the defaults, like unset ones.
pub fn build_claim(request: &DiscountRequest, defaults: &ClaimDefaults, now: i64) -> DiscountClaim {
    let days = i64::from(request.resolved_days(defaults));

    DiscountClaim {
        currency: or_default(&request.currency, &defaults.currency),
        discount_code: or_default(&request.discount_code, &defaults.discount_code),
        discount_percent: request.discount_percent,
        merchant_id: or_default(&request.merchant_id, &defaults.merchant_id),
        expires_at: now + days * SECONDS_PER_DAY,
        price: request.price,
        product_id: or_default(&request.product_id, &defaults.product_id),
        issued_at: now,
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Strict validation of a request, with defaults applied.
pub fn validate_request(
    request: &DiscountRequest,
    defaults: &ClaimDefaults,
    max_expires_in_days: u32,
) -> Result<(), TokenError> {
    if !request.price.is_finite() || request.price <= 0.0 {
        return Err(invalid("price", "must be a number greater than 0"));
    }

    if !request.discount_percent.is_finite()
        || !(0.0..=100.0).contains(&request.discount_percent)
    {
        return Err(invalid("discount_percent", "must be between 0 and 100"));
    }

    let product_id = or_default(&request.product_id, &defaults.product_id);
    if !product_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("product_id", "must contain only digits"));
    }

    let currency = or_default(&request.currency, &defaults.currency);
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(invalid("currency", "must be a three-letter uppercase code"));
    }

    let days = request.resolved_days(defaults);
    if days > max_expires_in_days {
        return Err(TokenError::InvalidClaim {
            field: "expires_in_days",
            reason: format!("must be between 1 and {max_expires_in_days}"),
        });
    }

    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> TokenError {
    TokenError::InvalidClaim {
        field,
        reason: reason.to_string(),
    }
}

/// Numbers with no fractional part are written as JSON integers (`0`, not `0.0`).
mod js_number {
    use serde::{Deserialize, Deserializer, Serializer, ser::Error};

    // Largest integer an IEEE double represents exactly.
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if !value.is_finite() {
            return Err(S::Error::custom(format!("{value} is not a JSON number")));
        }
        if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        f64::deserialize(deserializer)
    }
}
