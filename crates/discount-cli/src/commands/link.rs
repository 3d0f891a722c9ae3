//! `discount-link link` - Add a signed discount token to a product URL.

use super::{DiscountArgs, build_service, load_config};
use std::path::Path;

/// Join a site-relative path (`/product.html`) to the configured base URL.
fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with('/') && !url.starts_with("//") {
        format!("{}{}", base_url.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

/// Issue a token for `args` and return `url` with the token attached.
pub fn run(config_path: Option<&Path>, url: &str, args: &DiscountArgs) -> anyhow::Result<String> {
    if url.trim().is_empty() {
        anyhow::bail!("URL must not be empty");
    }

    let config = load_config(config_path)?;
    let service = build_service(&config, args.strict)?;

    let url = resolve_url(&service.defaults().base_url, url.trim());
    let link = service.add_discount_to_url(&url, &args.to_request())?;

    tracing::info!(
        url = %url,
        price = args.price,
        discount = args.discount,
        "Discount link created"
    );

    Ok(link)
}
