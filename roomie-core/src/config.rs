use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ROOMIE_API_URL must not be empty")]
    MissingApiUrl,
    #[error("ROOMIE_PAGE_LIMIT must be greater than zero")]
    ZeroPageLimit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root of the REST API; the messaging routes live under `<url>/messages`.
    pub url: String,
    /// Bearer token attached to every request when present.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub page_limit: u32,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();

        Config {
            api: ApiConfig {
                url: env::var("ROOMIE_API_URL")
                    .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                token: env::var("ROOMIE_API_TOKEN")
                    .ok()
                    .filter(|t| !t.trim().is_empty()),
                timeout_secs: env::var("ROOMIE_HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            session: SessionConfig {
                page_limit: env::var("ROOMIE_PAGE_LIMIT")
                    .unwrap_or_else(|_| DEFAULT_PAGE_LIMIT.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_PAGE_LIMIT),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.url.trim().is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        if self.session.page_limit == 0 {
            return Err(ConfigError::ZeroPageLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.api.url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_url_and_zero_limit() {
        let mut config = Config::default();
        config.api.url = "   ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingApiUrl));

        let mut config = Config::default();
        config.session.page_limit = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPageLimit));
    }
}
