//! Error types for smeta

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Vision command is not configured (use --vision-command or `smeta config --set-vision-command`)")]
    MissingVisionCommand,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Merge was called with zero page results.
    #[error("No page results to merge")]
    EmptyInput,

    /// One page failed; the whole run is aborted.
    #[error("Page {page} analysis failed: {source}")]
    PageAnalysis {
        page: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("Invalid threshold `{name}` = {value}: {reason}")]
    ThresholdConfig {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid hints: {0}")]
    InvalidHints(String),

    #[error("Vision backend error: {0}")]
    Backend(String),

    #[error("Vision backend returned an empty response")]
    EmptyResponse,

    #[error("Price catalog error: {0}")]
    Catalog(String),

    #[error("Invalid estimate override: {0}")]
    InvalidOverride(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),
}

impl Error {
    /// Wrap a per-page failure with its 1-based page index.
    pub fn page(page: usize, source: Error) -> Self {
        Error::PageAnalysis {
            page,
            source: Box::new(source),
        }
    }

    /// 1-based index of the failing page, if this is a page failure.
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Error::PageAnalysis { page, .. } => Some(*page),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
