// Runtime configuration read from the environment (and `.env`, when present).

use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

use crate::auth::{DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS};
use crate::store::{self, StoreConfig};

/// Placeholder secret used when `JWT_SECRET` is unset
pub const INSECURE_DEFAULT_SECRET: &str = "your-secret-key-change-this-in-production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} environment variable is not set")]
    Missing { name: &'static str },

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },

    #[error("invalid DATABASE_URL: {0}")]
    Database(#[from] store::Error),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub host: IpAddr,
    pub port: u16,
    /// Development mode echoes internal error causes in 500 responses
    pub development: bool,
    pub db_max_pool_size: usize,
    pub bcrypt_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            jwt_secret: INSECURE_DEFAULT_SECRET.to_string(),
            jwt_expiration_hours: DEFAULT_TOKEN_TTL_HOURS,
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            development: false,
            db_max_pool_size: 20,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        message: e.to_string(),
    })
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_expiration_hours = match get("JWT_EXPIRATION_HOURS") {
            Some(raw) => parse::<i64>("JWT_EXPIRATION_HOURS", &raw)?,
            None => defaults.jwt_expiration_hours,
        };
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&jwt_expiration_hours) {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRATION_HOURS",
                message: format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
            });
        }

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(raw) => parse::<u32>("BCRYPT_COST", &raw)?,
            None => defaults.bcrypt_cost,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                message: "must be between 4 and 31".to_string(),
            });
        }

        let environment = get("APP_ENV").or_else(|| get("NODE_ENV"));

        Ok(Self {
            database_url: get("DATABASE_URL"),
            jwt_secret: get("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration_hours,
            host: match get("HOST") {
                Some(raw) => parse("HOST", &raw)?,
                None => defaults.host,
            },
            port: match get("PORT") {
                Some(raw) => parse("PORT", &raw)?,
                None => defaults.port,
            },
            development: environment.as_deref() == Some("development"),
            db_max_pool_size: match get("DB_MAX_POOL_SIZE") {
                Some(raw) => parse("DB_MAX_POOL_SIZE", &raw)?,
                None => defaults.db_max_pool_size,
            },
            bcrypt_cost,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == INSECURE_DEFAULT_SECRET
    }

    /// Store configuration derived from `DATABASE_URL`
    pub fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        let url = self
            .database_url
            .as_deref()
            .ok_or(ConfigError::Missing { name: "DATABASE_URL" })?;
        Ok(StoreConfig::from_connection_string(url)?.with_max_pool_size(self.db_max_pool_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.jwt_expiration_hours, 168);
        assert!(config.uses_default_secret());
        assert!(!config.development);
        assert!(config.database_url.is_none());
        assert!(matches!(
            config.store_config(),
            Err(ConfigError::Missing { name: "DATABASE_URL" })
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://u:p@db:6543/chat"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("NODE_ENV", "development"),
            ("DB_MAX_POOL_SIZE", "5"),
        ])
        .unwrap();

        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:8080");
        assert!(config.development);
        assert!(!config.uses_default_secret());

        let store = config.store_config().unwrap();
        assert_eq!(store.host, "db");
        assert_eq!(store.port, 6543);
        assert_eq!(store.max_pool_size, 5);
    }

    #[test]
    fn test_app_env_wins_over_node_env() {
        let config = config_from(&[("APP_ENV", "production"), ("NODE_ENV", "development")]).unwrap();
        assert!(!config.development);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("JWT_EXPIRATION_HOURS", "0")]),
            Err(ConfigError::Invalid { name: "JWT_EXPIRATION_HOURS", .. })
        ));
        assert!(matches!(
            config_from(&[("BCRYPT_COST", "2")]),
            Err(ConfigError::Invalid { name: "BCRYPT_COST", .. })
        ));
    }

    #[test]
    fn test_token_lifetime_bounds() {
        assert!(matches!(
            config_from(&[("JWT_EXPIRATION_HOURS", "10000000000")]),
            Err(ConfigError::Invalid { name: "JWT_EXPIRATION_HOURS", .. })
        ));
        assert!(matches!(
            config_from(&[("JWT_EXPIRATION_HOURS", "-1")]),
            Err(ConfigError::Invalid { name: "JWT_EXPIRATION_HOURS", .. })
        ));
        let config = config_from(&[("JWT_EXPIRATION_HOURS", "87600")]).unwrap();
        assert_eq!(config.jwt_expiration_hours, MAX_TOKEN_TTL_HOURS);
    }

    #[test]
    fn test_bad_database_url() {
        let config = config_from(&[("DATABASE_URL", "mysql://nope")]).unwrap();
        assert!(matches!(config.store_config(), Err(ConfigError::Database(_))));
    }
}
