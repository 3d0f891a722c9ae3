//! Token management commands.
//!
//! `discount-link token mint` - Mint a bare discount token.
//! `discount-link token verify` - Verify a token and print its claims.
//! `discount-link token inspect` - Decode a token without verification.

use super::{DiscountArgs, build_service, load_config};
use anyhow::Context;
use discount_token::keys::{load_public_key_file, load_public_key_pem};
use discount_token::{DiscountClaim, PublicKey, TokenVerifier, inspect_token_unverified, url};
use std::fs;
use std::path::Path;

/// Resolve the token argument: a URL carrying `pv2`, a file, or the token itself.
fn resolve_token(input: &str) -> anyhow::Result<String> {
    let input = input.trim();

    // If it looks like a file path and the file exists, load from file
    let path = Path::new(input);
    let raw = if path.is_file() {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read token from file: {}", path.display()))?
            .trim()
            .to_string()
    } else {
        input.to_string()
    };

    if raw.contains('?') || raw.contains("://") {
        return url::extract(&raw)
            .map(str::to_string)
            .with_context(|| format!("No {} parameter found in URL", url::PARAM));
    }

    Ok(raw)
}

/// Resolve the public key from `--public-key` or the configured key material.
fn resolve_public_key(
    config_path: Option<&Path>,
    public_key: Option<&Path>,
) -> anyhow::Result<PublicKey> {
    if let Some(path) = public_key {
        return load_public_key_file(path)
            .with_context(|| format!("Failed to load public key from file: {}", path.display()));
    }

    let config = load_config(config_path)?;
    let pem = config.keys.resolve_public_key()?.context(
        "Public key not provided. Either pass --public-key <path> or configure keys.public_key_file",
    )?;
    load_public_key_pem(&pem).context("Failed to parse public key. Expected SPKI PEM")
}

/// Mint a new discount token.
pub fn mint(config_path: Option<&Path>, args: &DiscountArgs) -> anyhow::Result<String> {
    let config = load_config(config_path)?;
    let service = build_service(&config, args.strict)?;
    Ok(service.generate_token(&args.to_request())?)
}

/// Verify a token (or URL) and return its claims.
pub fn verify(
    config_path: Option<&Path>,
    public_key: Option<&Path>,
    token: &str,
) -> anyhow::Result<DiscountClaim> {
    let public_key = resolve_public_key(config_path, public_key)?;
    let token = resolve_token(token)?;

    let claims = TokenVerifier::new(public_key).verify(&token)?;
    Ok(claims)
}

/// Inspect a token without verification.
pub fn inspect(token: &str) -> anyhow::Result<()> {
    let token = resolve_token(token)?;
    let info = inspect_token_unverified(&token)?;

    println!("Token Information (signature NOT verified):");
    println!("  Algorithm: {}", info.header.alg);
    if let Some(typ) = &info.header.typ {
        println!("  Type: {typ}");
    }
    print_claims("", &info.claims)
}

/// Print claims in a human-readable form followed by the raw JSON.
pub fn print_claims(title: &str, claims: &DiscountClaim) -> anyhow::Result<()> {
    if !title.is_empty() {
        println!("{title}");
    }
    println!();
    println!("Token Details:");
    println!("  Product: {}", claims.product_id);
    println!("  Merchant: {}", claims.merchant_id);
    println!("  Price: {} {}", claims.price, claims.currency);
    println!("  Discount: {}% (code {})", claims.discount_percent, claims.discount_code);
    if let Some(issued) = claims.issued_at_utc() {
        println!("  Issued: {}", issued.to_rfc3339());
    }
    if let Some(expires) = claims.expires_at_utc() {
        println!("  Expires: {}", expires.to_rfc3339());
    }
    println!();
    println!("{}", serde_json::to_string_pretty(claims)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use discount_token::KeyPair;
    use tempfile::tempdir;

    fn write_config(dir: &Path) -> std::path::PathBuf {
        let config_path = dir.join("discount-link.yaml");
        fs::write(
            &config_path,
            format!(
                "keys:\n  private_key_file: {}\n  public_key_file: {}\n  on_missing: persist\n",
                dir.join("private-key.pem").display(),
                dir.join("public-key.pem").display()
            ),
        )
        .unwrap();
        config_path
    }

    #[test]
    fn test_mint_and_verify() {
        let dir = tempdir().unwrap();
        let config_path = write_config(dir.path());

        let args = DiscountArgs {
            price: 11.25,
            discount: 5.0,
            ..Default::default()
        };
        let token = mint(Some(&config_path), &args).unwrap();

        let claims = verify(Some(&config_path), None, &token).unwrap();
        assert_eq!(claims.price, 11.25);
        assert_eq!(claims.discount_percent, 5.0);
        assert_eq!(claims.product_id, "148415");
    }

    #[test]
    fn test_verify_url_with_explicit_public_key() {
        let dir = tempdir().unwrap();
        let config_path = write_config(dir.path());

        let token = mint(
            Some(&config_path),
            &DiscountArgs {
                price: 3.5,
                ..Default::default()
            },
        )
        .unwrap();
        let link = url::attach("https://shop.example/p?ref=ads", &token);

        let claims = verify(None, Some(&dir.path().join("public-key.pem")), &link).unwrap();
        assert_eq!(claims.price, 3.5);
    }

    #[test]
    fn test_verify_token_from_file() {
        let dir = tempdir().unwrap();
        let config_path = write_config(dir.path());

        let token = mint(
            Some(&config_path),
            &DiscountArgs {
                price: 1.0,
                ..Default::default()
            },
        )
        .unwrap();
        let token_path = dir.path().join("token.txt");
        fs::write(&token_path, format!("{token}\n")).unwrap();

        verify(Some(&config_path), None, token_path.to_str().unwrap()).unwrap();
    }

    #[test]
    fn test_verify_with_wrong_key_fails() {
        let dir = tempdir().unwrap();
        let config_path = write_config(dir.path());

        let token = mint(
            Some(&config_path),
            &DiscountArgs {
                price: 1.0,
                ..Default::default()
            },
        )
        .unwrap();

        let other = KeyPair::generate().unwrap();
        let other_path = dir.path().join("other-public.pem");
        fs::write(&other_path, other.public_key_pem().unwrap()).unwrap();

        let err = verify(None, Some(&other_path), &token).unwrap_err();
        assert!(err.to_string().contains("invalid signature"));
    }

    #[test]
    fn test_url_without_token() {
        let err = resolve_token("https://shop.example/p?ref=ads").unwrap_err();
        assert!(err.to_string().contains("pv2"));
    }

    #[test]
    fn test_inspect() {
        let dir = tempdir().unwrap();
        let config_path = write_config(dir.path());

        let token = mint(
            Some(&config_path),
            &DiscountArgs {
                price: 1.0,
                ..Default::default()
            },
        )
        .unwrap();
        inspect(&token).unwrap();
    }
}
