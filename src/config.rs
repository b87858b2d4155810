//! Runtime configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::cli::chat::presenter::REVEAL_DELAY;
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_STORE: &str = "soriana";

/// Settings for a chat session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the scraping API (the endpoint is `<api_url>/api/scrape`).
    pub api_url: Url,
    /// Store identifier sent with every query.
    pub store_name: String,
    /// File holding the serialized flow state.
    pub state_path: PathBuf,
    /// Pause before each product is revealed.
    pub reveal_delay: Duration,
    /// Timeout for the scraping request.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            store_name: DEFAULT_STORE.to_string(),
            state_path: default_state_path(),
            reveal_delay: REVEAL_DELAY,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Build a config from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup, falling back to the
    /// defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("COMPARADOR_API_URL") {
            config.api_url = parse_url("COMPARADOR_API_URL", &raw)?;
        }
        if let Some(store) = lookup("COMPARADOR_STORE") {
            if store.trim().is_empty() {
                return Err(invalid("COMPARADOR_STORE", "store name cannot be empty"));
            }
            config.store_name = store.trim().to_string();
        }
        if let Some(path) = lookup("COMPARADOR_STATE_FILE") {
            config.state_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("COMPARADOR_REVEAL_DELAY_MS") {
            config.reveal_delay = Duration::from_millis(parse_number("COMPARADOR_REVEAL_DELAY_MS", &raw)?);
        }
        if let Some(raw) = lookup("COMPARADOR_TIMEOUT_SECS") {
            let secs = parse_number("COMPARADOR_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(invalid("COMPARADOR_TIMEOUT_SECS", "timeout must be positive"));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

pub fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| invalid(key, &e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(key, "expected an http(s) URL"));
    }
    Ok(url)
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, &format!("expected a whole number, got {:?}", raw)))
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("comparador")
        .join("flow_state.json")
}
