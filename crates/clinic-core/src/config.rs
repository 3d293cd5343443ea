//! Backend configuration.

use std::fmt;

use thiserror::Error;

/// Environment variable holding the hosted backend's base URL.
pub const URL_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the backend's anonymous API key.
pub const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Connection settings for the hosted backend.
#[derive(Clone, PartialEq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url));
        }
        Ok(Self {
            url,
            anon_key: anon_key.into().trim().to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Read both values from the process environment. Either one missing is
    /// fatal for the remote backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both values through `lookup`; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let url = read(URL_VAR)?;
        let anon_key = read(ANON_KEY_VAR)?;
        Self::new(url, anon_key)
    }

    /// Set the HTTP request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// Keeps the API key out of log output
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = BackendConfig::from_lookup(lookup(&[
            (URL_VAR, "https://clinic.example.co/"),
            (ANON_KEY_VAR, "anon-key"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://clinic.example.co");
        assert_eq!(config.anon_key, "anon-key");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_missing_values_are_fatal() {
        let err = BackendConfig::from_lookup(lookup(&[(ANON_KEY_VAR, "anon-key")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(URL_VAR));

        let err = BackendConfig::from_lookup(lookup(&[
            (URL_VAR, "https://clinic.example.co"),
            (ANON_KEY_VAR, "   "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(ANON_KEY_VAR));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            BackendConfig::new("clinic.example.co", "k"),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = BackendConfig::new("https://clinic.example.co", "anon-key").unwrap();
        assert!(!format!("{:?}", config).contains("anon-key"));
    }
}
