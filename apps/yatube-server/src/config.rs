//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use yatube_core::pagination::POSTS_PER_PAGE;
use yatube_infra::database::DatabaseConfig;

/// Directory holding the bundled templates.
pub const DEFAULT_TEMPLATES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub posts_per_page: u64,
    pub templates_dir: String,
    pub run_migrations: bool,
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        },
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database = DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 20)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", 2)?,
        };

        let posts_per_page: u64 = parse_var("POSTS_PER_PAGE", POSTS_PER_PAGE)?;
        if posts_per_page == 0 {
            return Err(ConfigError::Invalid {
                name: "POSTS_PER_PAGE",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            database,
            posts_per_page,
            templates_dir: env::var("TEMPLATES_DIR")
                .unwrap_or_else(|_| DEFAULT_TEMPLATES_DIR.to_string()),
            run_migrations: parse_flag("RUN_MIGRATIONS", true)?,
        })
    }
}
