//! CLI command implementations for discount-link.

pub mod keys;
pub mod link;
pub mod token;

use anyhow::Context;
use clap::Args;
use discount_core::DiscountLinkConfig;
use discount_token::{DiscountRequest, DiscountService};
use std::path::Path;

/// Discount values shared by `link` and `token mint`.
#[derive(Args, Debug, Clone, Default)]
pub struct DiscountArgs {
    /// Product price
    #[arg(long)]
    pub price: f64,

    /// Discount percentage
    #[arg(long, default_value_t = 0.0)]
    pub discount: f64,

    /// Days until the token expires (default from config)
    #[arg(long)]
    pub days: Option<u32>,

    /// Product ID (default from config)
    #[arg(long = "product-id")]
    pub product_id: Option<String>,

    /// Merchant ID (default from config)
    #[arg(long = "merchant-id")]
    pub merchant_id: Option<String>,

    /// Currency code (default from config)
    #[arg(long)]
    pub currency: Option<String>,

    /// Discount code (default from config)
    #[arg(long)]
    pub code: Option<String>,

    /// Reject out-of-range values instead of signing them
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

impl DiscountArgs {
    pub fn to_request(&self) -> DiscountRequest {
        DiscountRequest {
            discount_percent: self.discount,
            price: self.price,
            product_id: self.product_id.clone(),
            merchant_id: self.merchant_id.clone(),
            currency: self.currency.clone(),
            discount_code: self.code.clone(),
            expires_in_days: self.days,
        }
    }
}

/// Load configuration, failing with the offending path in the message.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<DiscountLinkConfig> {
    DiscountLinkConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load configuration from {}", p.display()),
        None => "Failed to load configuration".to_string(),
    })
}

/// Build the signing service from configuration and the `--strict` flag.
pub fn build_service(
    config: &DiscountLinkConfig,
    strict: bool,
) -> anyhow::Result<DiscountService> {
    let service =
        DiscountService::from_config(config).context("Failed to initialise signing keys")?;
    Ok(service.with_strict_validation(config.validation.strict || strict))
}
