//! Engine configuration, read once at start-up and injected into the engine

use std::time::Duration;
use tracing::warn;

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Absent key means the engine runs keyword extraction only
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl EngineConfig {
    /// Read `GEMINI_API_KEY`, `GEMINI_API_URL`, `GEMINI_MODEL` and
    /// `FILTER_EXTRACT_TIMEOUT_MS` from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        let base_url = lookup("GEMINI_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let model = lookup("GEMINI_MODEL").unwrap_or(defaults.model);

        let timeout = match lookup("FILTER_EXTRACT_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    warn!("Ignoring invalid FILTER_EXTRACT_TIMEOUT_MS={:?}", raw);
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            api_key,
            base_url,
            model,
            timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn remote_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_key() {
        let config = EngineConfig::from_lookup(lookup_from(&[]));
        assert!(!config.remote_enabled());
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let config = EngineConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_API_URL", "http://127.0.0.1:9000/"),
            ("FILTER_EXTRACT_TIMEOUT_MS", "250"),
        ]));
        assert!(config.remote_enabled());
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let config = EngineConfig::from_lookup(lookup_from(&[("FILTER_EXTRACT_TIMEOUT_MS", "soon")]));
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }
}
