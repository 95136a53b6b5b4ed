//! Environment configuration.
//!
//! Values come from a `.env` file first and the process environment second.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;
use vehicle_api::url::DEFAULT_PROXY_BASE_URL;
use vehicle_api::Vin;
use vehicle_auth::oauth::DEFAULT_REDIRECT_URI;
use vehicle_auth::token_store::DEFAULT_TOKENS_FILE;

pub const ENV_CLIENT_ID: &str = "TESLA_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "TESLA_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "TESLA_REDIRECT_URI";
pub const ENV_VEHICLE_VIN: &str = "TESLA_VEHICLE_VIN";
pub const ENV_PROXY_URL: &str = "TESLA_PROXY_URL";
pub const ENV_TOKENS_FILE: &str = "TESLA_TOKENS_FILE";

pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error(
        "TESLA_VEHICLE_VIN not found in .env\n\nPlease add your vehicle VIN to .env:\n  \
         TESLA_VEHICLE_VIN=your_vin_here\n\n\
         You can find your VIN in your vehicle under Settings > Software"
    )]
    MissingVin,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub vin: Vin,
    pub proxy_url: String,
    pub tokens_file: PathBuf,
    pub env_file_loaded: bool,
}

impl AppConfig {
    /// Load from `env_file`, falling back to the process environment.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        Self::load_with(env_file, env_string_opt)
    }

    /// Load from `env_file`, falling back to `lookup` for absent keys.
    pub fn load_with<F>(env_file: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (file_values, env_file_loaded) = read_env_file(env_file)?;
        let value = |key: &str| {
            file_values
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .or_else(|| lookup(key))
        };

        let vin = value(ENV_VEHICLE_VIN)
            .map(|raw| normalize_vin(&raw))
            .and_then(|raw| Vin::new(raw).ok())
            .ok_or(ConfigError::MissingVin)?;

        Ok(Self {
            client_id: value(ENV_CLIENT_ID),
            client_secret: value(ENV_CLIENT_SECRET),
            redirect_uri: value(ENV_REDIRECT_URI)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            vin,
            proxy_url: value(ENV_PROXY_URL).unwrap_or_else(|| DEFAULT_PROXY_BASE_URL.to_string()),
            tokens_file: value(ENV_TOKENS_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKENS_FILE)),
            env_file_loaded,
        })
    }
}

/// Strip everything but ASCII letters and digits and upper-case the rest.
pub fn normalize_vin(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn read_env_file(path: &Path) -> Result<(BTreeMap<String, String>, bool), ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(error) if error.not_found() => return Ok((BTreeMap::new(), false)),
        Err(source) => {
            return Err(ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut values = BTreeMap::new();
    for item in iter {
        let (key, value) = item.map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;
        values.insert(key, value);
    }
    Ok((values, true))
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        }
    })
}
