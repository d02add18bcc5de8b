//! Configuration management for BrickWorks Manager
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with the BW__ prefix, e.g. BW__ADMIN__PIN

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::PieceRates;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    pub subscription: SubscriptionConfig,

    /// Piece rates used when a factory has none configured
    pub rates: RatesConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubscriptionConfig {
    /// Length of the free trial given to a new factory
    pub trial_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RatesConfig {
    pub production_per_punch: Decimal,
    pub loading_per_brick: Decimal,
}

/// Operator access to the user overview
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    /// PIN for the admin routes; they refuse every request while unset
    pub pin: Option<String>,
}

impl RatesConfig {
    pub fn piece_rates(&self) -> PieceRates {
        PieceRates {
            production_per_punch: self.production_per_punch,
            loading_per_brick: self.loading_per_brick,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("BW__ENVIRONMENT")
            .or_else(|_| std::env::var("BW_ENVIRONMENT"))
            .unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("jwt.access_token_expiry", 86400)?
            .set_default("subscription.trial_days", shared::models::DEFAULT_TRIAL_DAYS)?
            .set_default("rates.production_per_punch", "15")?
            .set_default("rates.loading_per_brick", "2")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables, e.g. BW__DATABASE__URL
            .add_source(
                Environment::with_prefix("BW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
