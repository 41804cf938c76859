use anyhow::Result;
use sbechat_dispatch::DispatchSettings;
use sbechat_stats::StatsSettings;
use sbechat_store::DEFAULT_STORE_PATH;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/sbechat.toml";
const DEFAULT_TEMPLATES_PATH: &str = "data/templates.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// Location of the persistent JSON store.
    pub store_path: PathBuf,
    /// Location of the template catalog.
    pub templates_path: PathBuf,
    /// Append every outbound message to this JSONL file when set.
    pub transcript_path: Option<PathBuf>,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
    pub dispatch: DispatchSettings,
    pub stats: StatsSettings,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            templates_path: PathBuf::from(DEFAULT_TEMPLATES_PATH),
            transcript_path: None,
            seed: None,
            dispatch: DispatchSettings::default(),
            stats: StatsSettings::default(),
        }
    }
}

impl BotConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<BotConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    BotConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                BotConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
