use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::discovery::{DiscoveryQuery, YouTubeConfig, MAX_DAYS_AGO, MAX_PAGE_SIZE, MIN_DAYS_AGO};
use crate::llm::LLMConfig;

/// Config file locations, in lookup order
const CONFIG_PATHS: [&str; 2] = ["spike-studio.toml", "config/spike-studio.toml"];

/// Lowest minimum-views filter offered to users
pub const MIN_VIEWS_FLOOR: u64 = 1_000;

/// Smallest search page offered to users
pub const MIN_PAGE_SIZE: u32 = 10;

/// Configuration for Spike Studio
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API connection
    pub youtube: YouTubeConfig,

    /// Prefilled discovery filters
    pub discovery: DiscoveryQuery,

    /// LLM used for playlist generation
    pub llm: LLMConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for playlist exports
    pub export_dir: PathBuf,

    /// File name for playlist exports
    pub export_filename: String,

    /// Log level
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("."),
            export_filename: "project_suno_mj.csv".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(&self.export_filename)
    }
}

impl Config {
    /// First config file present in the working directory
    pub fn locate() -> Option<PathBuf> {
        Self::locate_in(Path::new("."))
    }

    /// First config file present under `dir`, in lookup order
    pub fn locate_in(dir: &Path) -> Option<PathBuf> {
        CONFIG_PATHS
            .iter()
            .map(|path| dir.join(path))
            .find(|path| path.exists())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_key) = lookup("SPIKE_STUDIO_YOUTUBE_API_KEY") {
            self.youtube.api_key = Some(api_key);
        }

        if let Some(api_key) = lookup("SPIKE_STUDIO_LLM_API_KEY") {
            self.llm.api_key = Some(api_key);
        }

        if let Some(log_level) = lookup("SPIKE_STUDIO_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        if let Some(export_dir) = lookup("SPIKE_STUDIO_EXPORT_DIR") {
            self.output.export_dir = PathBuf::from(export_dir);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate the prefilled filters against the ranges offered to users
    pub fn validate(&self) -> Result<()> {
        let discovery = &self.discovery;

        if !(MIN_DAYS_AGO..=MAX_DAYS_AGO).contains(&discovery.days_ago) {
            return Err(anyhow!(
                "discovery.days_ago must be between {} and {}",
                MIN_DAYS_AGO,
                MAX_DAYS_AGO
            ));
        }

        if discovery.min_views < MIN_VIEWS_FLOOR {
            return Err(anyhow!("discovery.min_views must be at least {}", MIN_VIEWS_FLOOR));
        }

        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&discovery.max_results) {
            return Err(anyhow!(
                "discovery.max_results must be between {} and {}",
                MIN_PAGE_SIZE,
                MAX_PAGE_SIZE
            ));
        }

        if self.youtube.timeout_seconds == 0 || self.llm.timeout_seconds == 0 {
            return Err(anyhow!("timeouts must be greater than 0"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Spike Studio Configuration:\n\
            - YouTube API: {}\n\
            - Default keyword: {}\n\
            - Window: {} days, min views {}, {} results, duration {}\n\
            - LLM: {:?} ({})\n\
            - Export: {}",
            self.youtube.api_base,
            self.discovery.keyword,
            self.discovery.days_ago,
            self.discovery.min_views,
            self.discovery.max_results,
            self.discovery.duration,
            self.llm.provider,
            self.llm.model,
            self.output.export_path().display()
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_youtube_api_key(mut self, api_key: String) -> Self {
        self.config.youtube.api_key = Some(api_key);
        self
    }

    pub fn with_llm_api_key(mut self, api_key: String) -> Self {
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryQuery) -> Self {
        self.config.discovery = discovery;
        self
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.export_dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
