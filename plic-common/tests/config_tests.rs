//! Configuration loading and credential resolution tests
//!
//! Tests that touch PLIC_* / OPENROUTER_API_KEY environment variables are
//! marked #[serial] so they do not race each other.

use plic_common::config::{
    resolve_config_path, resolve_credential, Credential, ProviderConfig, TomlConfig,
    CONFIG_PATH_ENV, DEFAULT_PORT,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

const ENV_KEY: &str = "sk-or-v1-env-0123456789abcdef";
const LEGACY_KEY: &str = "sk-or-v1-legacy-0123456789abcdef";
const TOML_KEY: &str = "sk-or-v1-toml-0123456789abcdef";

fn clear_key_env() {
    env::remove_var("PLIC_API_KEY");
    env::remove_var("OPENROUTER_API_KEY");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load_or_default(&path).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[server]
port = 6000

[provider]
model = "openai/gpt-4o"
temperature = 0.1
"#
    )
    .unwrap();

    let config = TomlConfig::load_or_default(file.path()).unwrap();
    assert_eq!(config.server.port, 6000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.provider.model, "openai/gpt-4o");
    assert!((config.provider.temperature - 0.1).abs() < f32::EPSILON);
    assert_eq!(config.provider.max_tokens, 2000);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_file_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server\nport = ").unwrap();

    let err = TomlConfig::load_or_default(file.path()).unwrap_err();
    assert!(err.to_string().contains("Parse TOML failed"));
}

#[test]
#[serial]
fn test_config_path_cli_beats_env() {
    env::set_var(CONFIG_PATH_ENV, "/tmp/plic-env.toml");

    let path = resolve_config_path(Some(Path::new("/tmp/plic-cli.toml")));
    assert_eq!(path, PathBuf::from("/tmp/plic-cli.toml"));

    let path = resolve_config_path(None);
    assert_eq!(path, PathBuf::from("/tmp/plic-env.toml"));

    env::remove_var(CONFIG_PATH_ENV);
}

#[test]
#[serial]
fn test_config_path_default() {
    env::remove_var(CONFIG_PATH_ENV);

    let path = resolve_config_path(None);
    assert!(path.ends_with("plic-gw.toml"));
}

#[test]
#[serial]
fn test_credential_env_priority() {
    clear_key_env();
    env::set_var("PLIC_API_KEY", ENV_KEY);
    env::set_var("OPENROUTER_API_KEY", LEGACY_KEY);

    let provider = ProviderConfig {
        api_key: Some(TOML_KEY.to_string()),
        ..Default::default()
    };
    assert_eq!(
        resolve_credential(&provider),
        Credential::Configured(ENV_KEY.to_string())
    );

    env::remove_var("PLIC_API_KEY");
    assert_eq!(
        resolve_credential(&provider),
        Credential::Configured(LEGACY_KEY.to_string())
    );

    clear_key_env();
    assert_eq!(
        resolve_credential(&provider),
        Credential::Configured(TOML_KEY.to_string())
    );
}

#[test]
#[serial]
fn test_credential_placeholder_is_absent() {
    clear_key_env();
    env::set_var("OPENROUTER_API_KEY", "【待填写 OpenRouter API Key】");

    let provider = ProviderConfig::default();
    let credential = resolve_credential(&provider);
    assert_eq!(credential, Credential::Absent);
    assert!(!credential.is_configured());

    clear_key_env();
}

#[test]
#[serial]
fn test_credential_invalid_env_falls_through_to_toml() {
    clear_key_env();
    env::set_var("PLIC_API_KEY", "   ");

    let provider = ProviderConfig {
        api_key: Some(TOML_KEY.to_string()),
        ..Default::default()
    };
    assert_eq!(resolve_credential(&provider).api_key(), Some(TOML_KEY));

    clear_key_env();
}

#[test]
fn test_default_port_constant() {
    assert_eq!(TomlConfig::default().server.port, DEFAULT_PORT);
}
