//! Runtime configuration read from the environment (and `.env`, once the
//! binary has called `dotenvy`).

use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/seo_compare.log";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the scraping service.
    pub service_url: String,
    /// Whole-request timeout. Keyword scrapes walk ten result pages, so this
    /// is generous.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub log_file_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `SEO_SERVICE_URL`, `SEO_SERVICE_TIMEOUT_SECS`,
    /// `SEO_CONNECT_TIMEOUT_SECS` and `LOG_FILE_PATH`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`AppConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secs = |key: &str, default: Duration| -> Result<Duration> {
            match lookup(key) {
                Some(raw) => {
                    let n: u64 = raw.trim().parse().with_context(|| {
                        format!("{key} must be a whole number of seconds, got `{raw}`")
                    })?;
                    Ok(Duration::from_secs(n))
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            service_url: lookup("SEO_SERVICE_URL").unwrap_or(defaults.service_url),
            request_timeout: secs("SEO_SERVICE_TIMEOUT_SECS", defaults.request_timeout)?,
            connect_timeout: secs("SEO_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            log_file_path: lookup("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SEO_SERVICE_URL", "http://scraper.internal:8080"),
            ("SEO_SERVICE_TIMEOUT_SECS", "30"),
            ("SEO_CONNECT_TIMEOUT_SECS", " 2 "),
            ("LOG_FILE_PATH", "/tmp/seo.log"),
        ]))
        .unwrap();

        assert_eq!(config.service_url, "http://scraper.internal:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.log_file_path, "/tmp/seo.log");
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("SEO_SERVICE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("SEO_SERVICE_TIMEOUT_SECS"));
    }
}
