//! Config command handlers: show effective configuration, write defaults,
//! change a single setting.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::app_config::{ConfigError, LoadedConfig, auth_file_path, init_config};

pub fn run_config_show_command(loaded: &LoadedConfig) {
    let config = &loaded.config;
    let resolved_path = loaded.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    if let Some(path) = loaded.path.as_deref() {
        println!("auth_file = {}", auth_file_path(path).display());
    }
    println!("api_id = {}", config.api_id);
    println!(
        "api_hash = {}",
        if config.api_hash.is_empty() {
            "<unset>"
        } else {
            "<set>"
        }
    );
    println!("session_name = {}", config.session_name);
    println!("phone_number = {}", config.phone_number);
    println!("download_folder = {}", config.download_folder.display());
    println!("chat_id = {}", config.chat_id);
    println!(
        "export_dir = {}",
        config
            .export_dir
            .as_ref()
            .map_or_else(|| "<unset>".to_string(), |dir| dir.display().to_string())
    );
}

pub fn run_config_init_command(explicit: Option<&Path>) -> Result<()> {
    let path = init_config(explicit).context("failed to write config file")?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Changes one setting and writes the whole config back.
///
/// Starts from the loaded config so other settings are kept. A config file
/// that exists but failed to load is left alone.
pub fn run_config_set_command(loaded: &LoadedConfig, key: &str, value: &str) -> Result<()> {
    let path = loaded.path.as_deref().ok_or(ConfigError::NoConfigDir)?;
    if !loaded.loaded_from_file && path.exists() {
        bail!(
            "Config file {} could not be read; fix or remove it first",
            path.display()
        );
    }

    let mut config = loaded.config.clone();
    config.set(key, value)?;
    config
        .save(path)
        .with_context(|| format!("failed to save config to {}", path.display()))?;
    println!("Set {key} in {}", path.display());
    Ok(())
}
