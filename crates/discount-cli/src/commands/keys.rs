//! Key management commands.
//!
//! `discount-link keys generate` - Generate a new ES256 keypair.

use discount_token::KeyPair;
use std::path::PathBuf;

pub const PRIVATE_KEY_FILE: &str = "private-key.pem";
pub const PUBLIC_KEY_FILE: &str = "public-key.pem";

/// Generate a new ES256 keypair.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = KeyPair::generate()?;

    if let Some(output_dir) = output {
        let private_path = output_dir.join(PRIVATE_KEY_FILE);
        let public_path = output_dir.join(PUBLIC_KEY_FILE);

        keypair.save_to_files(&private_path, &public_path)?;

        println!("✔ Generated ES256 keypair:");
        println!("  Private key: {}", private_path.display());
        println!("  Public key:  {}", public_path.display());
        println!();
        println!("⚠️  Keep your private key secure! Never commit it to version control.");
        println!();
        println!("Reference them from your configuration:");
        println!("  keys:");
        println!("    private_key_file: {}", private_path.display());
        println!("    public_key_file: {}", public_path.display());
    } else {
        println!("{}", keypair.private_key_pem()?);
        println!("{}", keypair.public_key_pem()?);
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}
