//! Configuration for the session token signer.
//!
//! The signer itself reads a single named property through [`Settings`].
//! The operator-facing knobs (log level, default lifetimes) are loaded from
//! environment variables into [`Config`] and validated at startup.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Name of the property holding the optional base64-encoded HS256 key.
pub const SECRET_KEY_PROPERTY: &str = "auth.jwt.base64_hs256_secret";

/// Source of named string settings.
pub trait Settings: Send + Sync {
    /// Value of the named property, if set.
    fn get_string(&self, name: &str) -> Option<String>;
}

/// Settings backed by process environment variables.
///
/// A property name maps to an upper-cased variable with `.` replaced by `_`,
/// so `auth.jwt.base64_hs256_secret` is read from
/// `AUTH_JWT_BASE64_HS256_SECRET`. Blank values count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl EnvSettings {
    /// Load `.env` (if present) and return the settings source.
    #[must_use]
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self
    }

    /// Environment variable backing the given property.
    #[must_use]
    pub fn variable_name(property: &str) -> String {
        property.replace('.', "_").to_uppercase()
    }
}

impl Settings for EnvSettings {
    fn get_string(&self, name: &str) -> Option<String> {
        env::var(Self::variable_name(name))
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

/// In-memory settings.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    /// Create an empty settings map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl Settings for MapSettings {
    fn get_string(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid TTL value
    #[error("Invalid TTL for {0}: must be greater than 0")]
    InvalidTtl(&'static str),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Operator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Log level filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Lifetime of newly issued session tokens, in seconds
    pub session_ttl_seconds: i64,
    /// Lifetime granted by a refresh, in seconds
    pub refresh_ttl_seconds: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            session_ttl_seconds: DEFAULT_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

// 3 days
const DEFAULT_TTL_SECONDS: i64 = 3 * 24 * 60 * 60;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or a TTL is not positive.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: parse_env("LOG_JSON", false)?,
            session_ttl_seconds: parse_env("SESSION_TTL_SECONDS", DEFAULT_TTL_SECONDS)?,
            refresh_ttl_seconds: parse_env("REFRESH_TTL_SECONDS", DEFAULT_TTL_SECONDS)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a TTL is zero or negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidTtl("SESSION_TTL_SECONDS"));
        }
        if self.refresh_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidTtl("REFRESH_TTL_SECONDS"));
        }
        Ok(())
    }
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
