use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub database: Database,
    #[serde(default)]
    pub mining: Mining,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.to_string_lossy()))?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> anyhow::Result<Config> {
        let config: Config =
            toml::from_str(contents).with_context(|| "Failed to parse config TOML")?;
        if config.version != CONFIG_VERSION {
            bail!(
                "Unsupported config version {}, expected {CONFIG_VERSION}",
                config.version
            );
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub persist_mode: PersistMode,
}

/// How mined tracks are mapped onto the schema's foreign keys
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// every entity is inserted unconditionally, tracks point at placeholder id 1
    #[default]
    Append,
    /// entities are looked up by natural key and created only when missing
    Resolve,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Mining {
    #[serde(default)]
    pub follow_symlinks: bool,
}
