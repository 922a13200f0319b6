use crate::packages::ANY_VERSION;
use channel::{ChannelConfig, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIGURATION_DIR: &str = "studio-config";
pub const STYLE_FILE_NAME: &str = "plotter_style.xml";

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write settings file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioSettings {
    pub configuration_dir: PathBuf,
    pub package_index: Option<PathBuf>,
    pub version_selector: String,
    pub event_capacity: usize,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            configuration_dir: PathBuf::from(DEFAULT_CONFIGURATION_DIR),
            package_index: None,
            version_selector: ANY_VERSION.to_string(),
            event_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl StudioSettings {
    /// A missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: StudioSettings =
            toml::from_str(&data).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.normalize()
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let data = toml::to_string_pretty(self)?;
        std::fs::write(path, data).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn normalize(mut self) -> Result<Self, SettingsError> {
        self.event_capacity = self.event_capacity.max(1);
        let selector = self.version_selector.trim();
        if selector.is_empty() {
            return Err(SettingsError::Invalid(
                "version_selector must not be empty".to_string(),
            ));
        }
        self.version_selector = selector.to_string();
        Ok(self)
    }

    pub fn style_file(&self) -> PathBuf {
        self.configuration_dir.join(STYLE_FILE_NAME)
    }

    pub fn event_channel_config(&self) -> ChannelConfig {
        ChannelConfig::bounded(self.event_capacity)
    }
}
