use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "redmark";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_theme")]
    pub theme: String,

    /// strftime pattern used for annotation timestamps in the list.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default = "default_true")]
    pub mouse_enabled: bool,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_theme() -> String {
    "Oceanic Next".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            theme: default_theme(),
            date_format: default_date_format(),
            mouse_enabled: true,
        }
    }
}

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

impl Settings {
    /// Load from the platform config dir. Missing or unreadable settings
    /// fall back to the defaults; a broken file never stops startup.
    pub fn load() -> Self {
        let Some(path) = preferred_config_path() else {
            warn!("could not determine config directory, using default settings");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("settings file not found at {path:?}, using defaults");
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
                Ok(settings) => {
                    debug!("loaded settings from {path:?}");
                    settings
                }
                Err(e) => {
                    error!("failed to parse settings file {path:?}: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                error!("failed to read settings file {path:?}: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = preferred_config_path() else {
            warn!("could not determine config directory, cannot save settings");
            return;
        };
        self.save_to(&path);
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    error!("failed to create config directory {parent:?}: {e}");
                    return;
                }
            }
        }
        match serde_yaml::to_string(self) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    error!("failed to write settings to {path:?}: {e}");
                }
            }
            Err(e) => error!("failed to serialize settings: {e}"),
        }
    }
}
