//! Default claim values applied when a request omits them.

use serde::{Deserialize, Serialize};

/// Fallback values for optional discount request fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimDefaults {
    /// Catalog product identifier.
    #[serde(default = "default_product_id")]
    pub product_id: String,

    /// Merchant identifier.
    #[serde(default = "default_merchant_id")]
    pub merchant_id: String,

    /// ISO 4217 currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Promotional code identifier.
    #[serde(default = "default_discount_code")]
    pub discount_code: String,

    /// Token lifetime in days.
    #[serde(default = "default_expires_in_days")]
    pub expires_in_days: u32,

    /// Shop base URL, used to resolve relative product paths.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ClaimDefaults {
    fn default() -> Self {
        Self {
            product_id: default_product_id(),
            merchant_id: default_merchant_id(),
            currency: default_currency(),
            discount_code: default_discount_code(),
            expires_in_days: default_expires_in_days(),
            base_url: default_base_url(),
        }
    }
}

fn default_product_id() -> String {
    "148415".to_string()
}

fn default_merchant_id() -> String {
    "103556247".to_string()
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_discount_code() -> String {
    "ABCDEF".to_string()
}

fn default_expires_in_days() -> u32 {
    30
}

fn default_base_url() -> String {
    "https://stage.club-of-wine.de".to_string()
}
