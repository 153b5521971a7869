use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::transport::TransportMode;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_GATEWAY_URL: &str = "WEATHER_GATEWAY_URL";
pub const ENV_API_KEY: &str = "OPENWEATHERMAP_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "WEATHER_TIMEOUT_SECS";

/// Where the gateway function is hosted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    pub url: String,
}

/// Direct access to the provider. Only meaningful on hosts trusted with the key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default = "default_provider_url")]
    pub base_url: String,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// transport = "gateway"
/// timeout_secs = 10
///
/// [gateway]
/// url = "https://example.execute-api.eu-west-1.amazonaws.com/production/weather"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportMode,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: TransportMode::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            gateway: None,
            provider: None,
        }
    }
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from disk, then apply environment overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-widget", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply environment-style overrides. `lookup` returns the value of a variable, if set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_GATEWAY_URL) {
            self.set_gateway_url(url);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.upsert_provider_api_key(key);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
        }

        Ok(())
    }

    pub fn set_gateway_url(&mut self, url: String) {
        self.gateway = Some(GatewayConfig { url });
    }

    /// Set/replace the provider API key, keeping any custom base URL.
    pub fn upsert_provider_api_key(&mut self, api_key: String) {
        match &mut self.provider {
            Some(provider) => provider.api_key = api_key,
            None => {
                self.provider = Some(ProviderConfig { api_key, base_url: default_provider_url() })
            }
        }
    }

    pub fn gateway_url(&self) -> Option<&str> {
        self.gateway.as_ref().map(|g| g.url.as_str()).filter(|u| !u.trim().is_empty())
    }

    pub fn provider_api_key(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.api_key.as_str()).filter(|k| !k.trim().is_empty())
    }

    pub fn provider_base_url(&self) -> &str {
        self.provider.as_ref().map_or(DEFAULT_PROVIDER_URL, |p| p.base_url.as_str())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.transport, TransportMode::Gateway);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn parses_full_file() {
        let cfg = Config::from_toml(
            r#"
            transport = "direct"
            timeout_secs = 4

            [gateway]
            url = "https://gw.example/weather"

            [provider]
            api_key = "KEY"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.transport, TransportMode::Direct);
        assert_eq!(cfg.timeout_secs, 4);
        assert_eq!(cfg.gateway_url(), Some("https://gw.example/weather"));
        assert_eq!(cfg.provider_api_key(), Some("KEY"));
        assert_eq!(cfg.provider_base_url(), DEFAULT_PROVIDER_URL);
    }

    #[test]
    fn save_format_roundtrips() {
        let mut cfg = Config::default();
        cfg.set_gateway_url("https://gw.example/weather".into());
        cfg.upsert_provider_api_key("KEY".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let mut cfg = Config::default();
        cfg.set_gateway_url("  ".into());
        cfg.upsert_provider_api_key(String::new());

        assert_eq!(cfg.gateway_url(), None);
        assert_eq!(cfg.provider_api_key(), None);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_GATEWAY_URL, "https://env.example/weather"),
            (ENV_API_KEY, "ENV_KEY"),
            (ENV_TIMEOUT_SECS, "3"),
        ]);

        let mut cfg = Config::default();
        cfg.apply_overrides(|name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.gateway_url(), Some("https://env.example/weather"));
        assert_eq!(cfg.provider_api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn env_key_override_keeps_custom_base_url() {
        let mut cfg = Config::from_toml(
            r#"
            [provider]
            api_key = "FILE_KEY"
            base_url = "http://localhost:9000/weather"
            "#,
        )
        .unwrap();

        cfg.apply_overrides(|name| (name == ENV_API_KEY).then(|| "ENV_KEY".to_string()))
            .unwrap();

        assert_eq!(cfg.provider_api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.provider_base_url(), "http://localhost:9000/weather");
    }

    #[test]
    fn bad_timeout_override_is_an_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(|name| (name == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }
}
