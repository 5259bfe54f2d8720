//! CLI definition using clap

use clap::{Args, Parser, Subcommand};
use smeta_types::{Error, Hints, OutputFormat, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smeta")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Renovation cost estimates from apartment floor plans")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Vision command template, overrides config (e.g. "llm -m gpt-4o -a {image}")
    #[arg(long, global = true)]
    pub vision_command: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze floor-plan pages (image files, directories or URLs)
    Analyze {
        /// Page images in order; directories expand to their images sorted by name
        #[arg(required = true)]
        pages: Vec<String>,

        #[command(flatten)]
        hints: HintArgs,

        /// Write the analysis report as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Merge already-extracted page results (JSON files) into one building model
    Merge {
        /// Page result files in page order
        #[arg(required = true)]
        pages: Vec<PathBuf>,

        #[command(flatten)]
        hints: HintArgs,

        /// Write the merged analysis as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Derive work quantities and a priced estimate from an analysis
    Estimate {
        /// Analysis JSON (a building model, or the output of `analyze`/`merge`)
        analysis: PathBuf,

        #[command(flatten)]
        hints: HintArgs,

        /// Price catalog (TOML or CSV); overrides config
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Manual line corrections: JSON array of {stage_code, work_code, qty?, unit_price?}
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Write the estimate as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the vision command template
        #[arg(long)]
        set_vision_command: Option<String>,

        /// Set the default price catalog file
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Declared project parameters, from flags or a JSON file
#[derive(Args, Debug, Clone, Default)]
pub struct HintArgs {
    /// Hints JSON file (floor_area_m2, living_rooms_count, has_kitchen_living, bathrooms_count, ceiling_height_m)
    #[arg(long, conflicts_with_all = ["area", "living_rooms", "kitchen_living", "bathrooms", "ceiling_height"])]
    pub hints: Option<PathBuf>,

    /// Declared total floor area (m²)
    #[arg(long)]
    pub area: Option<f64>,

    /// Declared number of living rooms
    #[arg(long)]
    pub living_rooms: Option<u32>,

    /// The apartment has a combined kitchen-living room
    #[arg(long)]
    pub kitchen_living: bool,

    /// Declared number of bathrooms
    #[arg(long)]
    pub bathrooms: Option<u32>,

    /// Declared ceiling height (m)
    #[arg(long)]
    pub ceiling_height: Option<f64>,
}

impl HintArgs {
    /// Resolve to validated hints; `None` when nothing was declared
    pub fn resolve(&self) -> Result<Option<Hints>> {
        let hints = if let Some(ref path) = self.hints {
            if !path.exists() {
                return Err(Error::FileNotFound(path.display().to_string()));
            }
            let content = std::fs::read_to_string(path)?;
            let hints: Hints = serde_json::from_str(&content)
                .map_err(|e| Error::InvalidHints(format!("{}: {}", path.display(), e)))?;
            Some(hints)
        } else if let Some(area) = self.area {
            Some(Hints {
                floor_area_m2: area,
                living_rooms_count: self.living_rooms.unwrap_or(0),
                has_kitchen_living: self.kitchen_living,
                bathrooms_count: self.bathrooms.unwrap_or(0),
                ceiling_height_m: self.ceiling_height,
            })
        } else if self.living_rooms.is_some()
            || self.kitchen_living
            || self.bathrooms.is_some()
            || self.ceiling_height.is_some()
        {
            return Err(Error::InvalidHints(
                "--area is required when declaring hints".to_string(),
            ));
        } else {
            None
        };

        if let Some(ref h) = hints {
            h.validate()?;
        }
        Ok(hints)
    }
}
