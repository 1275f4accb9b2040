//! Odoo connection settings sourced from the environment.

use std::env;
use std::fmt;

use reqwest::Url;

use super::error::{ConfigError, ConfigResult};

pub const ENV_BASE_URL: &str = "ODOO_BASE_URL";
pub const ENV_DATABASE: &str = "ODOO_DATABASE";
pub const ENV_USERNAME: &str = "ODOO_USERNAME";
pub const ENV_PASSWORD: &str = "ODOO_PASSWORD";
pub const ENV_API_KEY: &str = "ODOO_API_KEY";

/// Connection settings for one Odoo instance.
///
/// Immutable once loaded. The password (or API key) is never printed by
/// the `Debug` implementation.
#[derive(Clone, PartialEq, Eq)]
pub struct OdooConfig {
    pub base_url: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for OdooConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooConfig")
            .field("base_url", &self.base_url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<hidden>")
            .finish()
    }
}

impl OdooConfig {
    /// Load the settings from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the settings through an arbitrary variable lookup.
    ///
    /// Values are trimmed; blank values count as missing. `ODOO_PASSWORD`
    /// takes precedence over `ODOO_API_KEY`.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &str| {
            get(name).ok_or_else(|| ConfigError::Missing {
                name: name.to_string(),
            })
        };

        let password = get(ENV_PASSWORD)
            .or_else(|| get(ENV_API_KEY))
            .ok_or_else(|| ConfigError::Missing {
                name: format!("{ENV_PASSWORD} or {ENV_API_KEY}"),
            })?;

        let base_url = require(ENV_BASE_URL)?;
        validate_base_url(&base_url)?;

        Ok(Self {
            base_url,
            database: require(ENV_DATABASE)?,
            username: require(ENV_USERNAME)?,
            password,
        })
    }

    /// Resolve an endpoint path (e.g. `/xmlrpc/2/common`) against the base URL.
    pub fn endpoint_url(&self, path: &str) -> ConfigResult<Url> {
        let base = parse_base_url(&self.base_url)?;
        base.join(path).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_base_url(url: &str) -> ConfigResult<Url> {
    Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn validate_base_url(url: &str) -> ConfigResult<()> {
    let parsed = parse_base_url(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
