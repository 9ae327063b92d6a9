//! Layered configuration: defaults, global file, workspace files and environment.

use super::support::{EnvGuard, ENV_MUTEX};
use kcl_compose::cli::{Commands, RunContext};
use kcl_compose::config::{global_config_path, ConfigLoader};
use kcl_compose::provider::ProviderType;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ENV_KEYS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "KCL_ENV",
    "KCL__GENERATION__DEFAULT_PROVIDER",
    "KCL__GENERATION__MIN_COMPONENTS",
];

fn isolate(temp: &TempDir) -> EnvGuard {
    let guard = EnvGuard::new(ENV_KEYS);
    std::env::set_var("HOME", temp.path());
    std::env::set_var("XDG_CONFIG_HOME", temp.path().join("xdg"));
    for key in &ENV_KEYS[2..] {
        std::env::remove_var(key);
    }
    guard
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_defaults_apply_without_files() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let _env = isolate(&temp);

    let config = ConfigLoader::load(temp.path()).unwrap();
    assert!(config.providers.is_empty());
    assert_eq!(config.generation.min_components, 5);
    assert_eq!(config.generation.min_data_components, 1);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.output, "stderr");
}

#[test]
fn test_workspace_overrides_global_and_env_overrides_both() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let _env = isolate(&temp);

    let global = global_config_path().unwrap();
    assert!(global.starts_with(temp.path()));
    write(
        &global,
        r#"
[providers.local]
provider_type = "local"
model = "llama3"
endpoint = "http://localhost:8080"

[generation]
default_provider = "local"
min_components = 3
"#,
    );

    let workspace = temp.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        r#"
[providers.claude]
provider_type = "anthropic"
model = "claude-3-5-sonnet"

[generation]
min_components = 4
"#,
    );

    let config = ConfigLoader::load(&workspace).unwrap();
    assert_eq!(config.providers.len(), 2);
    assert_eq!(config.providers["claude"].provider_type, ProviderType::Anthropic);
    assert_eq!(config.generation.default_provider.as_deref(), Some("local"));
    assert_eq!(config.generation.min_components, 4);

    std::env::set_var("KCL__GENERATION__DEFAULT_PROVIDER", "claude");
    std::env::set_var("KCL__GENERATION__MIN_COMPONENTS", "7");
    let config = ConfigLoader::load(&workspace).unwrap();
    assert_eq!(config.generation.default_provider.as_deref(), Some("claude"));
    assert_eq!(config.generation.min_components, 7);
}

#[test]
fn test_environment_named_file_layers_over_base() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let _env = isolate(&temp);

    let workspace = temp.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        "[generation]\nlibrary_version = \"1.0\"\n",
    );
    write(
        &workspace.join("config").join("staging.toml"),
        "[generation]\nlibrary_version = \"2.0\"\n",
    );

    assert_eq!(ConfigLoader::load(&workspace).unwrap().generation.library_version, "1.0");
    std::env::set_var("KCL_ENV", "staging");
    assert_eq!(ConfigLoader::load(&workspace).unwrap().generation.library_version, "2.0");
}

#[test]
fn test_explicit_file_must_exist() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let _env = isolate(&temp);

    assert!(ConfigLoader::load_from_file(&temp.path().join("missing.toml")).is_err());
}

#[test]
fn test_invalid_provider_is_rejected_at_startup() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let _env = isolate(&temp);

    let file = temp.path().join("bad.toml");
    write(
        &file,
        "[providers.local]\nprovider_type = \"local\"\nmodel = \"\"\n",
    );
    let result = RunContext::new(temp.path().to_path_buf(), Some(file));
    assert!(result.is_err());
}

#[test]
fn test_config_command_redacts_api_keys() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let _env = isolate(&temp);

    let file = temp.path().join("keys.toml");
    write(
        &file,
        "[providers.openai]\nprovider_type = \"openai\"\nmodel = \"gpt-4o\"\napi_key = \"sk-secret-value\"\n",
    );
    let context = RunContext::new(temp.path().to_path_buf(), Some(file)).unwrap();
    let output = context.execute(&Commands::Config).unwrap();
    assert!(output.contains("gpt-4o"));
    assert!(!output.contains("sk-secret-value"));
}
