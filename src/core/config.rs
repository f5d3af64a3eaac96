use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use thiserror::Error;
use tracing::debug;

pub const EXCHANGE_RATE_KEY_VAR: &str = "EXCHANGE_RATE_API_KEY";
pub const NEWS_KEY_VAR: &str = "NEWS_API_KEY";
pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

/// Raised by a provider that was asked to call upstream without a key.
#[derive(Debug, Error)]
#[error("{variable} is not defined")]
pub struct MissingApiKey {
    pub variable: &'static str,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    fn with_base_url(base_url: &str) -> Self {
        ProviderConfig {
            base_url: base_url.to_string(),
            api_key: None,
        }
    }

    /// Environment variable first, then the key from the config file.
    pub fn resolve_api_key(&self, variable: &str) -> Option<String> {
        std::env::var(variable)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: ProviderConfig,
    #[serde(default = "default_news")]
    pub news: ProviderConfig,
    #[serde(default = "default_alpha_vantage")]
    pub alpha_vantage: ProviderConfig,
}

fn default_exchange_rate() -> ProviderConfig {
    ProviderConfig::with_base_url("https://v6.exchangerate-api.com")
}

fn default_news() -> ProviderConfig {
    ProviderConfig::with_base_url("https://newsapi.org")
}

fn default_alpha_vantage() -> ProviderConfig {
    ProviderConfig::with_base_url("https://www.alphavantage.co")
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange_rate: default_exchange_rate(),
            news: default_news(),
            alpha_vantage: default_alpha_vantage(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind: default_bind(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: usize,
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_retries() -> usize {
    2
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerSettings::default(),
            providers: ProvidersConfig::default(),
            cache_ttl_secs: default_cache_ttl(),
            retries: default_retries(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxdesk", "fxdesk")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  bind: "0.0.0.0:8080"
  cors_origins:
    - "http://localhost:5173"
providers:
  exchange_rate:
    base_url: "http://example.com/rates"
    api_key: "file-key"
  news:
    base_url: "http://example.com/news"
cache_ttl_secs: 5
retries: 0
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(
            config.providers.exchange_rate.base_url,
            "http://example.com/rates"
        );
        assert_eq!(
            config.providers.exchange_rate.api_key.as_deref(),
            Some("file-key")
        );
        assert_eq!(config.providers.news.base_url, "http://example.com/news");
        assert!(config.providers.news.api_key.is_none());
        assert_eq!(
            config.providers.alpha_vantage.base_url,
            "https://www.alphavantage.co"
        );
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(
            config.providers.exchange_rate.base_url,
            "https://v6.exchangerate-api.com"
        );
        assert_eq!(config.providers.news.base_url, "https://newsapi.org");
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.retries, 2);
    }

    #[test]
    fn test_resolve_api_key_prefers_environment() {
        let provider = ProviderConfig {
            base_url: "http://localhost".to_string(),
            api_key: Some("from-file".to_string()),
        };

        // Variable names unique to this test so parallel tests don't race on them.
        unsafe { std::env::set_var("FXDESK_TEST_KEY_SET", "from-env") };
        assert_eq!(
            provider.resolve_api_key("FXDESK_TEST_KEY_SET").as_deref(),
            Some("from-env")
        );
        unsafe { std::env::remove_var("FXDESK_TEST_KEY_SET") };

        assert_eq!(
            provider.resolve_api_key("FXDESK_TEST_KEY_UNSET").as_deref(),
            Some("from-file")
        );

        let blank = ProviderConfig {
            base_url: "http://localhost".to_string(),
            api_key: Some("  ".to_string()),
        };
        assert!(blank.resolve_api_key("FXDESK_TEST_KEY_UNSET").is_none());
    }

    #[test]
    fn test_load_from_path_reports_parse_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "retries: [not, a, number]").unwrap();
        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
