// Configuration types shared across all discount-link crates
pub mod config;

pub use config::{
    ClaimDefaults, ConfigError, DiscountLinkConfig, KeysConfig, MissingKeys, UrlConfig,
    ValidationConfig,
};
