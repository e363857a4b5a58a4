//! Pixel transforms and the stages that wrap them.
//!
//! - [`bleed`]: mirrored and solid bleed padding
//! - [`sides`]: directional edge extension
//! - [`corners`]: radial corner reconstruction
//!
//! The transforms are independent; chain them through a
//! [`Pipeline`](crate::execution::pipeline::Pipeline) or call them directly.

pub mod bleed;
pub mod corners;
pub mod registry;
pub mod sides;
pub mod stages;

pub use bleed::{add_bleed, add_bleed_solid};
pub use corners::{extend_corners, refill_corner, Marker, Sample};
pub use registry::StageRegistry;
pub use sides::{extend_sides, Directive};
pub use stages::{ExtendCorners, ExtendSides, MirrorBleed, SolidBleed};
