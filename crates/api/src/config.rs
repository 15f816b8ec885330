//! Application configuration

use std::{env, str::FromStr, time::Duration};

/// Deployment environment, selects the log format and default verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Local,
    Dev,
    Prod,
}

impl FromStr for AppEnv {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            _ => Err(()),
        }
    }
}

impl AppEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Prod => "prod",
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub env: AppEnv,

    // Server
    pub bind_address: String,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Listing
    pub list_default_limit: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            env: env::var("APP_ENV")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(AppEnv::Prod),

            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 5)),
            shutdown_grace: Duration::from_secs(parse_or("SHUTDOWN_GRACE_SECS", 10)),

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),

            // Listing
            list_default_limit: {
                let limit: i64 = parse_or("LIST_DEFAULT_LIMIT", 100);
                if limit <= 0 {
                    return Err(ConfigError::Invalid(
                        "LIST_DEFAULT_LIMIT must be a positive integer",
                    ));
                }
                limit
            },
        })
    }
}

/// Read and parse an environment variable, falling back to `default` when unset or malformed
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure config tests run serially (they modify shared env vars)
    static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "APP_ENV",
        "BIND_ADDRESS",
        "REQUEST_TIMEOUT_SECS",
        "SHUTDOWN_GRACE_SECS",
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "LIST_DEFAULT_LIMIT",
    ];

    fn cleanup_config() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_config_defaults_and_required_vars() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();

        // === Missing DATABASE_URL ===
        cleanup_config();
        match Config::from_env() {
            Err(ConfigError::Missing("DATABASE_URL")) => {}
            other => panic!("Expected Missing error for DATABASE_URL, got: {:?}", other),
        }

        // === Defaults ===
        env::set_var("DATABASE_URL", "postgres://test");
        let config = Config::from_env().unwrap();
        assert_eq!(config.env, AppEnv::Prod);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.shutdown_grace, Duration::from_secs(10));
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.list_default_limit, 100);

        // === Overrides ===
        env::set_var("APP_ENV", "local");
        env::set_var("BIND_ADDRESS", "127.0.0.1:9000");
        env::set_var("REQUEST_TIMEOUT_SECS", "30");
        env::set_var("DATABASE_MAX_CONNECTIONS", "4");
        env::set_var("LIST_DEFAULT_LIMIT", "25");
        let config = Config::from_env().unwrap();
        assert_eq!(config.env, AppEnv::Local);
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.database_max_connections, 4);
        assert_eq!(config.list_default_limit, 25);

        // === Malformed numbers fall back, unknown env falls back to prod ===
        env::set_var("APP_ENV", "staging");
        env::set_var("REQUEST_TIMEOUT_SECS", "soon");
        let config = Config::from_env().unwrap();
        assert_eq!(config.env, AppEnv::Prod);
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        // === Non-positive list limit rejected ===
        env::set_var("LIST_DEFAULT_LIMIT", "0");
        assert!(matches!(Config::from_env(), Err(ConfigError::Invalid(_))));

        cleanup_config();
    }

    #[test]
    fn test_app_env_parsing() {
        assert_eq!("local".parse::<AppEnv>(), Ok(AppEnv::Local));
        assert_eq!("DEV".parse::<AppEnv>(), Ok(AppEnv::Dev));
        assert_eq!("development".parse::<AppEnv>(), Ok(AppEnv::Dev));
        assert_eq!("prod".parse::<AppEnv>(), Ok(AppEnv::Prod));
        assert!("qa".parse::<AppEnv>().is_err());
        assert_eq!(AppEnv::Dev.as_str(), "dev");
    }
}
