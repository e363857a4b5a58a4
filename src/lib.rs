//! # Cardbleed - control-image driven pixel reconstruction
//!
//! Cardbleed prepares card and print artwork for cutting. It rebuilds the
//! parts of an image a scan or export lost, then grows the canvas with bleed
//! so the cut can drift without exposing a white edge.
//!
//! ## Features
//!
//! - **Mirrored bleed**: pad every side with reflections of the image
//! - **Directional edge extension**: a control image marks pixels to stretch
//!   left, up, right or down to the border
//! - **Radial corner reconstruction**: a control image marks a center, edge
//!   samples and targets per quadrant; targets are repainted by interpolating
//!   the samples by angle around the center
//! - **Batch processing**: one pipeline over many files, in parallel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cardbleed::prelude::*;
//! use std::sync::Arc;
//!
//! let corners = Arc::new(codec::load("controls/corners.png")?);
//! let pipeline = Pipeline::new()
//!     .with_stage(ExtendCorners::new(corners))
//!     .with_stage(MirrorBleed::new(36));
//!
//! let card = codec::load("card.png")?;
//! codec::save(&pipeline.run(card)?, "card_bleed.png")?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: pixel types, codec, errors, the stage trait and configuration
//! - [`transforms`]: the reconstruction and bleed algorithms and their stages
//! - [`execution`]: pipelines, batch runs and progress reporting
//!
//! ## Control images
//!
//! | Transform | Marker | Meaning |
//! |-----------|--------|---------|
//! | sides | `#FF....` | stretch to the left edge |
//! | sides | `#..FF..` | stretch to the top edge |
//! | sides | `#....FF` | stretch to the right edge |
//! | sides | other opaque | stretch to the bottom edge |
//! | corners | `#00FF00` | quadrant center |
//! | corners | `#FF00FF` | edge sample |
//! | corners | `#000000` | pixel to repaint |
//!
//! Fully transparent control pixels are ignored.

#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod transforms;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use cardbleed::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::codec::{self, OutputFormat};
    pub use crate::core::types::{Color, Mirror, Quadrant, RasterBuffer, Region};

    // Stages
    pub use crate::core::stage::{Category, ParameterInfo, RasterStage, StageMetadata};

    // Configuration
    pub use crate::core::config::{JobConfig, PipelineConfig, StageConfig};

    // Errors
    pub use crate::core::error::{BatchError, BleedError, BleedResult, ConfigError};

    // Transforms
    pub use crate::transforms::registry::StageRegistry;
    pub use crate::transforms::stages::{ExtendCorners, ExtendSides, MirrorBleed, SolidBleed};
    pub use crate::transforms::{add_bleed, add_bleed_solid, extend_corners, extend_sides};

    // Execution
    pub use crate::execution::batch::{BatchJob, BatchReport, BatchRunner};
    pub use crate::execution::pipeline::{ControlCache, Pipeline, PipelineStats};
    pub use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
