//! Application configuration: JSON settings file and the credentials file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use audio_downloader_core::remote::{
    AUTH_FILE_TEMPLATE, AuthFileValues, Credentials, DEFAULT_SESSION_NAME, parse_auth_file,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const APP_DIR_NAME: &str = "audio-downloader";
const CONFIG_FILE_NAME: &str = "config.json";
const AUTH_FILE_NAME: &str = "auth.txt";

/// Errors from reading or writing configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no config location: neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigDir,

    #[error("unknown config key '{key}' (expected one of: {})", CONFIG_KEYS.join(", "))]
    UnknownKey { key: String },
}

impl ConfigError {
    fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Keys accepted by [`AppConfig::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "api_id",
    "api_hash",
    "session_name",
    "phone_number",
    "download_folder",
    "chat_id",
    "export_dir",
];

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_id: String,
    pub api_hash: String,
    pub session_name: String,
    pub phone_number: String,
    /// Folder downloads and reports are written to.
    pub download_folder: PathBuf,
    /// Chat used when `--chat` is not given.
    pub chat_id: String,
    /// Chat export used when `--export-dir` is not given.
    pub export_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_id: String::new(),
            api_hash: String::new(),
            session_name: DEFAULT_SESSION_NAME.to_string(),
            phone_number: String::new(),
            download_folder: default_download_folder(),
            chat_id: String::new(),
            export_dir: None,
        }
    }
}

impl AppConfig {
    /// Session credentials from the config, overridden by the credentials file.
    #[must_use]
    pub fn credentials(&self, auth_file: &AuthFileValues) -> Credentials {
        let phone = self.phone_number.trim();
        let session_name = if self.session_name.trim().is_empty() {
            DEFAULT_SESSION_NAME.to_string()
        } else {
            self.session_name.clone()
        };
        Credentials {
            api_id: self.api_id.clone(),
            api_hash: self.api_hash.clone(),
            session_name,
            phone_number: (!phone.is_empty()).then(|| phone.to_string()),
        }
        .merged_with(auth_file)
    }

    /// Sets one setting from its textual form.
    ///
    /// Values are trimmed. An empty `export_dir` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "api_id" => self.api_id = value.to_string(),
            "api_hash" => self.api_hash = value.to_string(),
            "session_name" => self.session_name = value.to_string(),
            "phone_number" => self.phone_number = value.to_string(),
            "download_folder" => self.download_folder = PathBuf::from(value),
            "chat_id" => self.chat_id = value.to_string(),
            "export_dir" => self.export_dir = (!value.is_empty()).then(|| PathBuf::from(value)),
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Writes the config as pretty JSON, creating parent folders.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let body = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::write(parent, e))?;
        }
        fs::write(path, body).map_err(|e| ConfigError::write(path, e))?;
        info!(path = %path.display(), "config saved");
        Ok(())
    }
}

fn default_download_folder() -> PathBuf {
    env_var_non_empty_os("HOME").map_or_else(
        || PathBuf::from("TelegramMusic"),
        |home| PathBuf::from(home).join("Music").join("TelegramMusic"),
    )
}

/// Config loaded from disk, with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: Option<PathBuf>,
    pub config: AppConfig,
    pub loaded_from_file: bool,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/audio-downloader/config.json`
/// 2. `$HOME/.config/audio-downloader/config.json`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config from `explicit` or the default path.
///
/// A missing, unreadable or malformed file yields defaults; the last two
/// are logged.
#[must_use]
pub fn load_config(explicit: Option<&Path>) -> LoadedConfig {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(resolve_default_config_path);
    let Some(path_ref) = path.as_deref() else {
        return LoadedConfig {
            path,
            config: AppConfig::default(),
            loaded_from_file: false,
        };
    };

    if !path_ref.exists() {
        debug!(path = %path_ref.display(), "no config file; using defaults");
        return LoadedConfig {
            path,
            config: AppConfig::default(),
            loaded_from_file: false,
        };
    }

    let parsed = fs::read_to_string(path_ref)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str::<AppConfig>(&raw).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => LoadedConfig {
            path,
            config,
            loaded_from_file: true,
        },
        Err(e) => {
            warn!(path = %path_ref.display(), error = %e, "failed to load config; using defaults");
            LoadedConfig {
                path,
                config: AppConfig::default(),
                loaded_from_file: false,
            }
        }
    }
}

/// Path of the credentials file kept next to the config file.
#[must_use]
pub fn auth_file_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(AUTH_FILE_NAME)
}

/// Reads the credentials file, writing a fill-in template if it is missing.
///
/// Failures only cost the overrides: they are logged and empty values are
/// returned.
pub fn load_auth_file(path: &Path) -> AuthFileValues {
    match fs::read_to_string(path) {
        Ok(raw) => parse_auth_file(&raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if let Err(e) = write_auth_template(path) {
                warn!(error = %e, "failed to create credentials template");
            } else {
                info!(path = %path.display(), "created credentials template");
            }
            AuthFileValues::default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read credentials file");
            AuthFileValues::default()
        }
    }
}

fn write_auth_template(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::write(parent, e))?;
    }
    fs::write(path, AUTH_FILE_TEMPLATE).map_err(|e| ConfigError::write(path, e))
}

/// Writes the default config to `path` (or the default location).
pub fn init_config(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(resolve_default_config_path)
        .ok_or(ConfigError::NoConfigDir)?;
    AppConfig::default().save(&path)?;
    Ok(path)
}
