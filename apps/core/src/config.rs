use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging;

pub const DEFAULT_GLOBAL_HOTKEY: &str = "ctrl+b";
pub const DEFAULT_RECORD_EXTENSION: &str = ".json";
const CONFIG_FILE_NAME: &str = "user_config.json";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Encode(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Encode(error) => write!(f, "encode error: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub include_subdirs: bool,
    pub record_extension: String,
    pub global_hotkey: String,
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            data_dir: base.join("data"),
            include_subdirs: true,
            record_extension: DEFAULT_RECORD_EXTENSION.to_string(),
            global_hotkey: DEFAULT_GLOBAL_HOTKEY.to_string(),
            config_path: base.join(CONFIG_FILE_NAME),
        }
    }
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.data_dir.as_os_str().is_empty() {
        return Err("data_dir is required".into());
    }

    if !cfg.record_extension.starts_with('.') || cfg.record_extension.len() < 2 {
        return Err("record_extension must start with '.' and name an extension".into());
    }

    if cfg.global_hotkey.trim().is_empty() {
        return Err("global_hotkey is required".into());
    }

    Ok(())
}

/// Base directory for the config file, hotkey bindings file, logs, and the
/// default data directory. `PROMPTDECK_HOME` overrides it for tests and
/// portable installs.
pub fn stable_app_data_dir() -> PathBuf {
    if let Ok(custom) = std::env::var("PROMPTDECK_HOME") {
        if !custom.trim().is_empty() {
            return PathBuf::from(custom);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            if !local.trim().is_empty() {
                return PathBuf::from(local).join("PromptDeck");
            }
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(home) = std::env::var("HOME") {
            if !home.trim().is_empty() {
                return PathBuf::from(home).join(".promptdeck");
            }
        }
    }

    std::env::temp_dir().join("promptdeck")
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    data_dir: String,
    #[serde(default = "default_include_subdirs")]
    include_subdirs: bool,
    #[serde(default = "default_record_extension")]
    file_extension: String,
    #[serde(default = "default_global_hotkey")]
    global_hotkey: String,
}

fn default_include_subdirs() -> bool {
    true
}

fn default_record_extension() -> String {
    DEFAULT_RECORD_EXTENSION.to_string()
}

fn default_global_hotkey() -> String {
    DEFAULT_GLOBAL_HOTKEY.to_string()
}

/// Loads the user config, falling back to built-in defaults when the file is
/// absent or unreadable. A configured data directory that no longer exists
/// falls back to the default data directory, which is created, and the
/// corrected config is written back.
pub fn load(config_path_override: Option<PathBuf>) -> Result<Config, ConfigError> {
    let defaults = Config::default();
    let config_path = config_path_override.unwrap_or_else(|| defaults.config_path.clone());

    let mut config = match read_config_file(&config_path) {
        Some(file) => Config {
            data_dir: PathBuf::from(file.data_dir),
            include_subdirs: file.include_subdirs,
            record_extension: file.file_extension,
            global_hotkey: file.global_hotkey,
            config_path: config_path.clone(),
        },
        None => Config {
            config_path: config_path.clone(),
            ..defaults.clone()
        },
    };

    if config.data_dir != defaults.data_dir && !config.data_dir.exists() {
        logging::warn(&format!(
            "configured data directory {} does not exist; falling back to {}",
            config.data_dir.display(),
            defaults.data_dir.display()
        ));
        config.data_dir = defaults.data_dir.clone();
        if let Err(error) = save(&config) {
            logging::warn(&format!("failed to rewrite corrected config: {error}"));
        }
    }

    fs::create_dir_all(&config.data_dir)?;
    Ok(config)
}

fn read_config_file(config_path: &std::path::Path) -> Option<ConfigFile> {
    let raw = match fs::read_to_string(config_path) {
        Ok(raw) => raw,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                logging::warn(&format!(
                    "failed to read config {}: {error}",
                    config_path.display()
                ));
            }
            return None;
        }
    };

    match serde_json::from_str::<ConfigFile>(&raw) {
        Ok(file) => Some(file),
        Err(error) => {
            logging::warn(&format!(
                "failed to parse config {}: {error}",
                config_path.display()
            ));
            None
        }
    }
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    let file = ConfigFile {
        data_dir: cfg.data_dir.to_string_lossy().into_owned(),
        include_subdirs: cfg.include_subdirs,
        file_extension: cfg.record_extension.clone(),
        global_hotkey: cfg.global_hotkey.clone(),
    };
    let encoded = serde_json::to_string_pretty(&file).map_err(ConfigError::Encode)?;

    if let Some(parent) = cfg.config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&cfg.config_path, encoded)?;
    Ok(())
}
