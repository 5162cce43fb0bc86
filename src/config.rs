use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::duration::deserialize_duration;

/// Environment variables holding CoinGecko keys, in rotation order.
pub const MARKET_DATA_KEY_VARS: [&str; 2] = ["COINGECKO_API_KEY", "COINGECKO_API_KEY_2"];

/// Environment variable holding the language model credential.
pub const LLM_KEY_VAR: &str = "XAI_API_KEY";

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_market_data_base_url() -> String {
    "https://api.coingecko.com/api/v3/coins".to_string()
}

/// Minimum spacing between upstream requests (6 seconds).
fn default_min_request_interval() -> Duration {
    Duration::from_secs(6)
}

/// Window in which a repeated key use rotates to the next key (1 second).
fn default_key_rotation_window() -> Duration {
    Duration::from_secs(1)
}

fn default_llm_base_url() -> String {
    "https://api.x.ai/v1".to_string()
}

fn default_llm_model() -> String {
    "grok-2-latest".to_string()
}

/// Cached analyses stay fresh for 24 hours.
fn default_cache_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn deserialize_secrets<'de, D>(deserializer: D) -> std::result::Result<Vec<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
        .collect())
}

fn deserialize_optional_secret<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from))
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Upstream market data provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// Coin endpoint; the asset id is appended as the last path segment.
    pub base_url: String,

    /// API keys, rotated when used in quick succession. Empty means
    /// unauthenticated requests.
    #[serde(deserialize_with = "deserialize_secrets")]
    pub api_keys: Vec<SecretString>,

    #[serde(
        default = "default_min_request_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub min_request_interval: Duration,

    #[serde(
        default = "default_key_rotation_window",
        deserialize_with = "deserialize_duration"
    )]
    pub key_rotation_window: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_data_base_url(),
            api_keys: Vec::new(),
            min_request_interval: default_min_request_interval(),
            key_rotation_window: default_key_rotation_window(),
        }
    }
}

/// Language model provider configuration (OpenAI-compatible chat API).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,

    /// Without a key, analyses fall back to canned assessments.
    #[serde(deserialize_with = "deserialize_optional_secret")]
    pub api_key: Option<SecretString>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: 0.0,
            api_key: None,
        }
    }
}

/// Analysis cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl", deserialize_with = "deserialize_duration")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_cache_ttl(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub market_data: MarketDataConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply credentials using `lookup` in place of the process environment.
    ///
    /// Market data keys from the environment are appended after any keys in
    /// the file. The language model key from the environment wins over the file.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for var in MARKET_DATA_KEY_VARS {
            if let Some(key) = lookup(var).filter(|key| !key.trim().is_empty()) {
                self.market_data.api_keys.push(SecretString::from(key));
            }
        }

        if let Some(key) = lookup(LLM_KEY_VAR).filter(|key| !key.trim().is_empty()) {
            self.llm.api_key = Some(SecretString::from(key));
        }
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./simplifi.toml` if it exists in current directory
/// 2. `~/.config/simplifi/simplifi.toml` (XDG config directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("simplifi.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("simplifi").join("simplifi.toml");
    }

    local_config
}
