//! Level configuration file.
//!
//! Every section is optional; missing sections and fields take their
//! defaults. `.json` files are read as JSON, `.yaml`/`.yml` as YAML.

use roadstream_corridor::{CorridorConfig, LimiterConfig, MoverConfig};
use roadstream_decor::{RoadConfig, ScatterConfig};
use roadstream_stream::{GridConfig, StreamConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub stream: StreamConfig,
    pub grid: GridConfig,
    pub corridor: CorridorConfig,
    pub limiter: LimiterConfig,
    pub mover: MoverConfig,
    pub road: RoadConfig,
    pub scatter: ScatterConfig,
}

impl LevelConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_owned())),
        };
        tracing::info!(path = %path.display(), "level config loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
