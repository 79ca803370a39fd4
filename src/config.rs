use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::Result;

pub const DEFAULT_CONFIG_FILE: &str = "huffpack.toml";
pub const DEFAULT_EXTENSION: &str = "huff";
pub const DEFAULT_READ_CHUNK: usize = 64 * 1024; // 64KB

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Suffix (without the dot) marking a file as a container.
    pub extension: String,
    pub read_chunk_size: usize,
    pub max_input_size: u64,
    pub log_filter: String,
    pub output_directory: Option<PathBuf>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            read_chunk_size: DEFAULT_READ_CHUNK,
            max_input_size: u32::MAX as u64,
            log_filter: "huffpack=info".to_string(),
            output_directory: None,
        }
    }
}

impl PackConfig {
    /// Explicit path first, then `huffpack.toml` if present, else defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        match config_path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PackConfig = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path);
        Ok(config)
    }

    pub fn save(&self, config_path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let ext = self.extension.trim_start_matches('.');
        if ext.is_empty() {
            anyhow::bail!("extension must not be empty");
        }
        if self.read_chunk_size == 0 {
            anyhow::bail!("read_chunk_size must be positive");
        }
        if self.max_input_size > u32::MAX as u64 {
            anyhow::bail!("max_input_size cannot exceed {} bytes", u32::MAX);
        }
        Ok(())
    }

    /// `.huff`-style suffix including the dot.
    pub fn suffix(&self) -> String {
        format!(".{}", self.extension.trim_start_matches('.'))
    }

    pub fn ensure_output_directory(&self) -> Result<()> {
        if let Some(dir) = &self.output_directory {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                tracing::info!("Created output directory: {:?}", dir);
            }
        }
        Ok(())
    }
}
