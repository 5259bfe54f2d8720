//! Configuration management for smeta
//!
//! Config stored at: ~/.config/smeta/config.json

use serde::{Deserialize, Serialize};
use smeta_domain::EstimatorOptions;
use smeta_types::{ConfigError, OutputFormat, Result};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Vision command template, e.g. `llm -m gpt-4o -a {image}`
    #[serde(default)]
    pub vision_command: Option<String>,

    /// Price catalog file (TOML or CSV); built-in prices when unset
    #[serde(default)]
    pub price_catalog: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Overrides of takeoff coefficients and sanity thresholds
    #[serde(default)]
    pub options: EstimatorOptions,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vision_command: None,
            price_catalog: None,
            output_format: default_output_format(),
            options: EstimatorOptions::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("smeta");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, or defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        config.options.validate()?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Vision command, or an error telling the user how to set one
    pub fn require_vision_command(&self) -> Result<&str> {
        self.vision_command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVisionCommand.into())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Smeta Configuration")?;
        writeln!(f, "===================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Vision command:  {}",
            self.vision_command.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(
            f,
            "Price catalog:   {}",
            self.price_catalog
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        )?;
        writeln!(f, "Output format:   {}", self.output_format)?;
        writeln!(
            f,
            "Max pages:       {}",
            self.options.analysis.max_pages_per_analysis
        )?;
        writeln!(
            f,
            "Area tolerance:  {:.0}%",
            self.options.sanity.area_deviation_threshold * 100.0
        )?;
        writeln!(
            f,
            "Default height:  {} m",
            self.options.quantity.default_ceiling_height_m
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "Config file:     {}",
            Self::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(unknown)".to_string())
        )?;
        Ok(())
    }
}
