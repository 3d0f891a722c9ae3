use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::DiscountArgs;

#[derive(Parser, Debug)]
#[command(name = "discount-link", version, about = "Signed discount links for product pages")]
struct Cli {
    /// Configuration file (YAML or TOML)
    #[arg(long, global = true, env = "DISCOUNT_LINK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Signing key management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Add a signed discount token to a product URL.
    Link {
        /// Product page URL. Paths starting with '/' are joined to defaults.base_url
        url: String,

        #[command(flatten)]
        discount: DiscountArgs,
    },

    /// Token operations (mint/verify/inspect)
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new ES256 keypair as PEM files.
    Generate {
        /// Directory to write private-key.pem and public-key.pem into
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a bare discount token.
    Mint {
        #[command(flatten)]
        discount: DiscountArgs,
    },

    /// Verify a token (or a URL carrying one) and print its claims.
    Verify {
        /// Token, URL with a pv2 parameter, or file containing either
        token: String,

        /// SPKI PEM public key file (defaults to the configured key)
        #[arg(long = "public-key")]
        public_key: Option<PathBuf>,
    },

    /// Decode a token without verifying its signature.
    Inspect {
        /// Token, URL with a pv2 parameter, or file containing either
        token: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },

        Command::Link { url, discount } => {
            let link = commands::link::run(config, &url, &discount)?;
            println!("{link}");
        }

        Command::Token { cmd } => match cmd {
            TokenCommand::Mint { discount } => {
                let token = commands::token::mint(config, &discount)?;
                println!("{token}");
            }
            TokenCommand::Verify { token, public_key } => {
                let claims = commands::token::verify(config, public_key.as_deref(), &token)?;
                commands::token::print_claims("✔ Token is valid", &claims)?;
            }
            TokenCommand::Inspect { token } => commands::token::inspect(&token)?,
        },
    }

    Ok(())
}
