//! Core types and traits for the Cardbleed reconstruction engine.
//!
//! This module contains the foundational pieces every transform relies on:
//! - Pixel types (Color, Region, RasterBuffer)
//! - The raster codec
//! - Error types
//! - The stage trait and metadata
//! - Pipeline configuration

pub mod codec;
pub mod config;
pub mod error;
pub mod stage;
pub mod types;

// Re-export commonly used types
pub use config::{JobConfig, PipelineConfig, StageConfig};
pub use error::{BatchError, BleedError, BleedResult, ConfigError};
pub use stage::{Category, RasterStage, StageMetadata};
pub use types::{Color, Mirror, Quadrant, RasterBuffer, Region};
