//! Configuration loading and provider credential resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the service logs a warning and starts
//! on defaults. A TOML file that exists but does not parse is an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "PLIC_CONFIG";

/// Environment variables checked for the provider API key, in priority order
pub const API_KEY_ENV_VARS: [&str; 2] = ["PLIC_API_KEY", "OPENROUTER_API_KEY"];

/// Shortest string accepted as an API key
pub const MIN_API_KEY_LEN: usize = 20;

/// Default HTTP port for plic-gw
pub const DEFAULT_PORT: u16 = 5750;

/// Bootstrap configuration loaded from TOML file
///
/// Read once at startup; the service must restart to pick up changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body. A 10 MiB image grows by a third when
    /// base64 encoded, so the default leaves headroom above that.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// External AI provider settings (OpenAI-compatible chat completions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API root; `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API key (lowest priority source, after environment variables)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sent as `HTTP-Referer` for provider attribution
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Sent as `X-Title` for provider attribution
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
            referer: default_referer(),
            title: default_title(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_body_bytes() -> usize {
    15 * 1024 * 1024
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "anthropic/claude-opus-4.5".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_referer() -> String {
    "http://localhost:5750".to_string()
}

fn default_title() -> String {
    "Pakistan Image Checker".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load from `path`, falling back to defaults if the file does not exist
    ///
    /// Runs before logging is initialized (the file names the log level), so
    /// the caller reports which case applied.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Resolve the TOML config path
///
/// Priority: CLI argument → `PLIC_CONFIG` → `<config_dir>/plic/plic-gw.toml`
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    default_config_path()
}

/// OS-dependent default config file location
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("plic").join("plic-gw.toml"))
        .unwrap_or_else(|| PathBuf::from("./plic-gw.toml"))
}

// ============================================================================
// Provider credential
// ============================================================================

/// Provider credential state
///
/// A key is either configured (and passed [`is_valid_key`]) or absent. There
/// is no third "placeholder" state: strings that fail the format check are
/// treated as absent.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Configured(String),
    Absent,
}

impl Credential {
    pub fn is_configured(&self) -> bool {
        matches!(self, Credential::Configured(_))
    }

    pub fn api_key(&self) -> Option<&str> {
        match self {
            Credential::Configured(key) => Some(key),
            Credential::Absent => None,
        }
    }
}

// Never print the key itself
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Configured(key) => write!(f, "Configured(<{} chars>)", key.len()),
            Credential::Absent => f.write_str("Absent"),
        }
    }
}

/// Format check for provider API keys
///
/// Accepts at least [`MIN_API_KEY_LEN`] characters drawn from ASCII
/// alphanumerics, `-`, `_` and `.`. Template text such as
/// `your-key-here` or non-ASCII fill-in markers fails this check.
pub fn is_valid_key(key: &str) -> bool {
    key.len() >= MIN_API_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Resolve the provider API key
///
/// **Priority:** `PLIC_API_KEY` → `OPENROUTER_API_KEY` → TOML `provider.api_key`
pub fn resolve_credential(config: &ProviderConfig) -> Credential {
    let env_keys = API_KEY_ENV_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()));
    let toml_key = std::iter::once(("TOML", config.api_key.clone()));

    let mut candidates: Vec<(&str, String)> = Vec::new();
    for (source, value) in env_keys.chain(toml_key) {
        let Some(value) = value else { continue };
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }
        if is_valid_key(&value) {
            candidates.push((source, value));
        } else {
            warn!(
                source = source,
                key_len = value.len(),
                "Ignoring provider API key that fails the format check"
            );
        }
    }

    if candidates.len() > 1 {
        let sources: Vec<&str> = candidates.iter().map(|(s, _)| *s).collect();
        warn!(
            "Provider API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match candidates.into_iter().next() {
        Some((source, key)) => {
            info!("Provider API key loaded from {}", source);
            Credential::Configured(key)
        }
        None => {
            warn!(
                "Provider API key not configured. Set {} or provider.api_key in the TOML config",
                API_KEY_ENV_VARS[0]
            );
            Credential::Absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("sk-or-v1-0123456789abcdef0123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("short-key"));
        assert!(!is_valid_key("your-api-key-here"));
        assert!(!is_valid_key("【待填写】【待填写】【待填写】【待填写】"));
        assert!(!is_valid_key("sk-or-v1 0123456789abcdef0123"));
    }

    #[test]
    fn test_credential_debug_hides_key() {
        let credential = Credential::Configured("sk-or-v1-0123456789abcdef0123".to_string());
        let printed = format!("{:?}", credential);
        assert!(!printed.contains("0123456789"));
        assert!(printed.contains("chars"));
    }

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.provider.max_tokens, 2000);
        assert!((config.provider.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.logging.level, "info");
        assert!(config.provider.api_key.is_none());
    }
}
