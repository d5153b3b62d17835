use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Upper bound for a single stop lookup
    pub timeout: Duration,
    pub bind_addr: String,
    pub otlp_endpoint: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("bind_addr", &self.bind_addr)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .finish()
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = match var("RESOLVE_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "RESOLVE_TIMEOUT_SECS",
                    value,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            api_key: var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            otlp_endpoint: var("OTLP_ENDPOINT"),
        })
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() -> Result<(), anyhow::Error> {
        let config = config(&[])?;

        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.otlp_endpoint, None);
        assert_eq!(config.api_key(), Err(ConfigError::MissingApiKey));

        Ok(())
    }

    #[test]
    fn test_api_key_fallback() -> Result<(), anyhow::Error> {
        assert_eq!(config(&[("API_KEY", "old")])?.api_key(), Ok("old"));
        assert_eq!(
            config(&[("API_KEY", "old"), ("GEMINI_API_KEY", "new")])?.api_key(),
            Ok("new")
        );
        assert_eq!(
            config(&[("GEMINI_API_KEY", "  "), ("API_KEY", "old")])?.api_key(),
            Ok("old")
        );

        Ok(())
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(matches!(
            config(&[("RESOLVE_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidValue { key: "RESOLVE_TIMEOUT_SECS", .. })
        ));
        assert!(config(&[("RESOLVE_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_debug_hides_api_key() -> Result<(), anyhow::Error> {
        let config = config(&[("GEMINI_API_KEY", "secret-key")])?;

        assert!(!format!("{config:?}").contains("secret-key"));

        Ok(())
    }
}
