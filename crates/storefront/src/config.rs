//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STORE_HOST` - Bind address (default: 127.0.0.1)
//! - `STORE_PORT` - Listen port (falls back to `PORT`, then 3000)
//! - `STORE_NTH_ORDER` - Every Nth order may use a discount code (default: 3)
//! - `STORE_DISCOUNT_RATE` - Fraction taken off a discounted order (default: 0.10)
//! - `STORE_CATALOG_PATH` - JSON product catalog (default: the embedded catalog)
//! - `STORE_STATIC_DIR` - Directory of a built web UI to serve at `/`
//! - `LOG_FORMAT` - `json` for structured JSON logs (default: human-readable)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use checkout_lane_core::{Catalog, CatalogError, DiscountPolicy, DiscountRate};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Discount threshold and rate
    pub discount_policy: DiscountPolicy,
    /// Catalog file; `None` uses the catalog compiled into the binary
    pub catalog_path: Option<PathBuf>,
    /// Built frontend to serve for non-API paths
    pub static_dir: Option<PathBuf>,
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = parse_or_default(&get, "STORE_HOST", IpAddr::from([127, 0, 0, 1]))?;

        let port = match get("STORE_PORT") {
            Some(_) => parse_or_default(&get, "STORE_PORT", DEFAULT_PORT)?,
            None => parse_or_default(&get, "PORT", DEFAULT_PORT)?,
        };

        let every_nth = parse_or_default(
            &get,
            "STORE_NTH_ORDER",
            DiscountPolicy::DEFAULT_EVERY_NTH.get(),
        )?;
        let rate = parse_or_default(&get, "STORE_DISCOUNT_RATE", DiscountRate::default())?;
        let discount_policy = DiscountPolicy::new(every_nth, rate)
            .map_err(|e| invalid("STORE_NTH_ORDER", &e))?;

        let log_format = match get("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty" | "text") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected 'json' or 'pretty', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            discount_policy,
            catalog_path: get("STORE_CATALOG_PATH").map(PathBuf::from),
            static_dir: get("STORE_STATIC_DIR").map(PathBuf::from),
            log_format,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Load the configured catalog, or the embedded one.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the catalog file is unreadable or invalid.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_path(path),
            None => Catalog::embedded(),
        }
    }
}

const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key).map_or(Ok(default), |raw| {
        raw.trim().parse::<T>().map_err(|e| invalid(key, &e))
    })
}

fn invalid(key: &str, err: &impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), err.to_string())
}
