//! Error types for Cardbleed.
//!
//! Uses thiserror for structured errors with context. Errors carry enough
//! information to tell the user which image, quadrant or stage to fix.

use crate::core::types::{Quadrant, Region};
use std::path::PathBuf;
use thiserror::Error;

fn quadrant_label(quadrant: &Option<Quadrant>) -> String {
    match quadrant {
        Some(q) => format!("the {}", q),
        None => "the".to_string(),
    }
}

/// Top-level error type for Cardbleed.
#[derive(Error, Debug)]
pub enum BleedError {
    /// The control image has no CENTER marker where one is required.
    ///
    /// `quadrant` is `None` when a lone quadrant was refilled directly.
    #[error("No center marker found in {} control quadrant", quadrant_label(.quadrant))]
    MissingCenter { quadrant: Option<Quadrant> },

    #[error("Control image is {control_width}x{control_height} but source is {source_width}x{source_height}")]
    DimensionMismatch {
        source_width: u32,
        source_height: u32,
        control_width: u32,
        control_height: u32,
    },

    #[error("Control image ({control_width}x{control_height}) extends past the source ({source_width}x{source_height})")]
    ControlTooLarge {
        source_width: u32,
        source_height: u32,
        control_width: u32,
        control_height: u32,
    },

    #[error("Padding {padding} on a {width}x{height} image exceeds the maximum canvas size")]
    PaddingTooLarge { padding: u32, width: u32, height: u32 },

    #[error("Region {region} does not fit within a {width}x{height} buffer")]
    RegionOutOfBounds { region: Region, width: u32, height: u32 },

    #[error("Stage '{stage}' failed: {error}")]
    Stage { stage: String, error: Box<BleedError> },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors from loading or validating a pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Read { path: PathBuf, error: std::io::Error },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Pipeline has no stages")]
    NoStages,

    #[error("Pipeline has no jobs")]
    NoJobs,

    #[error("Job {index} has no output path and no output_dir is set")]
    MissingOutput { index: usize },

    #[error("Unknown stage '{0}'")]
    UnknownStage(String),
}

/// Errors during batch processing.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to process {path}: {error}")]
    ItemFailed { path: PathBuf, error: BleedError },

    #[error("{failed} of {total} images failed")]
    Incomplete { failed: usize, total: usize },
}

impl BleedError {
    /// Whether this error indicates a malformed control image that must stop the whole run.
    pub fn is_fatal(&self) -> bool {
        match self {
            BleedError::MissingCenter { .. } => true,
            BleedError::Stage { error, .. } => error.is_fatal(),
            _ => false,
        }
    }

    /// Wrap this error with the id of the stage that raised it.
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        BleedError::Stage {
            stage: stage.into(),
            error: Box::new(self),
        }
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            BleedError::MissingCenter { quadrant } => Some(format!(
                "Paint one pure green (#00FF00) pixel into {} quadrant of the corner control image",
                quadrant_label(quadrant)
            )),
            BleedError::DimensionMismatch {
                source_width,
                source_height,
                ..
            } => Some(format!(
                "Resize the control image to {}x{}",
                source_width, source_height
            )),
            BleedError::ControlTooLarge {
                source_width,
                source_height,
                ..
            } => Some(format!(
                "Crop the control image to at most {}x{}",
                source_width, source_height
            )),
            BleedError::PaddingTooLarge { width, height, .. } => Some(format!(
                "Use a padding of at most {}",
                (u32::MAX - (*width).max(*height)) / 2
            )),
            BleedError::Stage { error, .. } => error.suggested_fix(),
            _ => None,
        }
    }
}

/// Result type alias for Cardbleed operations.
pub type BleedResult<T> = Result<T, BleedError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_center_is_fatal() {
        let err = BleedError::MissingCenter {
            quadrant: Some(Quadrant::BottomRight),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("bottom-right"));
        assert!(err.suggested_fix().unwrap().contains("bottom-right"));

        let wrapped = err.in_stage("extend_corners");
        assert!(wrapped.is_fatal());
        assert!(wrapped.to_string().contains("extend_corners"));
    }

    #[test]
    fn test_dimension_errors_are_not_fatal() {
        let err = BleedError::DimensionMismatch {
            source_width: 10,
            source_height: 12,
            control_width: 5,
            control_height: 6,
        };
        assert!(!err.is_fatal());
        assert_eq!(err.suggested_fix().unwrap(), "Resize the control image to 10x12");
    }

    #[test]
    fn test_missing_center_without_quadrant() {
        let err = BleedError::MissingCenter { quadrant: None };
        assert_eq!(err.to_string(), "No center marker found in the control quadrant");
    }

    #[test]
    fn test_padding_too_large_suggests_limit() {
        let err = BleedError::PaddingTooLarge {
            padding: u32::MAX,
            width: 5,
            height: 9,
        };
        assert!(!err.is_fatal());
        assert_eq!(
            err.suggested_fix().unwrap(),
            format!("Use a padding of at most {}", (u32::MAX - 9) / 2)
        );
    }
}
