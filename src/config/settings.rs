use super::defaults::{
    DEFAULT_CONFIG_PATH, DEFAULT_MOUNT_TABLE, DEFAULT_PORT, DEFAULT_PREFERRED_VOLUME,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Daemon configuration. Read once at startup, never written back.
#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub port: u16,
    pub config_path: String,
    /// Mount table used to enumerate volumes when `volumes` is empty.
    pub mount_table: String,
    /// Explicit volume roots. Replaces mount table enumeration when non-empty.
    pub volumes: Vec<String>,
    /// Volume to select at startup, if it is listed.
    pub volume: Option<String>,
    /// Regex for the startup default when `volume` is unset or unlisted.
    pub preferred_volume: Option<String>,
    /// Start ticking as soon as the first scratch file is ready.
    pub autostart: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            mount_table: DEFAULT_MOUNT_TABLE.to_string(),
            volumes: Vec::new(),
            volume: None,
            preferred_volume: Some(DEFAULT_PREFERRED_VOLUME.to_string()),
            autostart: true,
        }
    }
}

impl AppConfig {
    /// Load configuration, merging defaults with config file values and env overrides.
    pub(crate) fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("NS_CONFIG_PATH") {
            config.config_path = path;
        }

        let cfg_path = Path::new(&config.config_path);
        if cfg_path.exists() {
            let contents = fs::read_to_string(cfg_path)
                .with_context(|| format!("Failed to read config file: {}", config.config_path))?;
            config.parse_ini(&contents);
        }

        if let Ok(port) = std::env::var("NS_PORT") {
            config.port = port.parse().context("NS_PORT must be a valid port number")?;
        }
        if let Ok(table) = std::env::var("NS_MOUNT_TABLE") {
            config.mount_table = table;
        }
        if let Ok(list) = std::env::var("NS_VOLUMES") {
            config.volumes = super::parser::split_list(&list);
        }
        if let Ok(volume) = std::env::var("NS_VOLUME") {
            config.volume = Some(volume).filter(|v| !v.is_empty());
        }

        config.validate()?;
        Ok(config)
    }
}
