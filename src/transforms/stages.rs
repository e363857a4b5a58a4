//! Built-in stages: each binds one transform to its settings.

use crate::core::error::{BleedError, BleedResult};
use crate::core::stage::{Category, ParameterInfo, RasterStage, StageMetadata};
use crate::core::types::{Color, RasterBuffer};
use crate::transforms::registry::StageRegistry;
use crate::transforms::{bleed, corners, sides};
use std::sync::Arc;

/// Register built-in stages.
pub fn register(registry: &mut StageRegistry) {
    registry.register(ExtendSides::describe());
    registry.register(ExtendCorners::describe());
    registry.register(MirrorBleed::describe());
    registry.register(SolidBleed::describe());
}

/// Stretches edge pixels outward as directed by a control image.
#[derive(Debug, Clone)]
pub struct ExtendSides {
    control: Arc<RasterBuffer>,
}

impl ExtendSides {
    pub fn new(control: Arc<RasterBuffer>) -> Self {
        Self { control }
    }

    pub fn describe() -> StageMetadata {
        StageMetadata::builder("extend_sides", "Extend Sides")
            .description(
                "Stretch pixels toward the image edge: red = left, green = up, blue = right, \
                 other opaque colors = down",
            )
            .category(Category::Reconstruct)
            .uses_control()
            .build()
    }
}

impl RasterStage for ExtendSides {
    fn metadata(&self) -> StageMetadata {
        Self::describe()
    }

    fn validate(&self, width: u32, height: u32) -> BleedResult<()> {
        if self.control.width() > width || self.control.height() > height {
            return Err(BleedError::ControlTooLarge {
                source_width: width,
                source_height: height,
                control_width: self.control.width(),
                control_height: self.control.height(),
            });
        }
        Ok(())
    }

    fn apply(&self, source: RasterBuffer) -> BleedResult<RasterBuffer> {
        sides::extend_sides_owned(source, &self.control)
    }

    fn clone_box(&self) -> Box<dyn RasterStage> {
        Box::new(self.clone())
    }
}

/// Rebuilds the four corners by angular interpolation around marked centers.
#[derive(Debug, Clone)]
pub struct ExtendCorners {
    control: Arc<RasterBuffer>,
}

impl ExtendCorners {
    pub fn new(control: Arc<RasterBuffer>) -> Self {
        Self { control }
    }

    pub fn describe() -> StageMetadata {
        StageMetadata::builder("extend_corners", "Extend Corners")
            .description(
                "Repaint black-marked pixels per quadrant by interpolating magenta-marked edge \
                 colors by angle around the green center",
            )
            .category(Category::Reconstruct)
            .uses_control()
            .build()
    }
}

impl RasterStage for ExtendCorners {
    fn metadata(&self) -> StageMetadata {
        Self::describe()
    }

    fn validate(&self, width: u32, height: u32) -> BleedResult<()> {
        if self.control.dimensions() != (width, height) {
            return Err(BleedError::DimensionMismatch {
                source_width: width,
                source_height: height,
                control_width: self.control.width(),
                control_height: self.control.height(),
            });
        }
        Ok(())
    }

    fn apply(&self, source: RasterBuffer) -> BleedResult<RasterBuffer> {
        corners::extend_corners(&source, &self.control)
    }

    fn clone_box(&self) -> Box<dyn RasterStage> {
        Box::new(self.clone())
    }
}

/// Pads the image with mirrored copies of itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorBleed {
    pub padding: u32,
}

impl MirrorBleed {
    pub fn new(padding: u32) -> Self {
        Self { padding }
    }

    pub fn describe() -> StageMetadata {
        StageMetadata::builder("mirror_bleed", "Mirrored Bleed")
            .description("Pad every side with a reflection of the image")
            .category(Category::Bleed)
            .parameter(ParameterInfo::required("padding", "Border width in pixels"))
            .resizes()
            .build()
    }
}

impl RasterStage for MirrorBleed {
    fn metadata(&self) -> StageMetadata {
        Self::describe()
    }

    fn validate(&self, width: u32, height: u32) -> BleedResult<()> {
        bleed::padded_size(width, height, self.padding).map(|_| ())
    }

    fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        let border = self.padding.saturating_mul(2);
        (width.saturating_add(border), height.saturating_add(border))
    }

    fn apply(&self, source: RasterBuffer) -> BleedResult<RasterBuffer> {
        bleed::add_bleed(&source, self.padding)
    }

    fn clone_box(&self) -> Box<dyn RasterStage> {
        Box::new(*self)
    }
}

/// Pads the image with a uniform color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidBleed {
    pub padding: u32,
    pub color: Color,
}

impl SolidBleed {
    pub fn new(padding: u32, color: Color) -> Self {
        Self { padding, color }
    }

    pub fn describe() -> StageMetadata {
        StageMetadata::builder("solid_bleed", "Solid Bleed")
            .description("Pad every side with a single color")
            .category(Category::Bleed)
            .parameter(ParameterInfo::required("padding", "Border width in pixels"))
            .parameter(ParameterInfo::optional("color", "Fill color as hex", "#000000"))
            .resizes()
            .build()
    }
}

impl RasterStage for SolidBleed {
    fn metadata(&self) -> StageMetadata {
        Self::describe()
    }

    fn validate(&self, width: u32, height: u32) -> BleedResult<()> {
        bleed::padded_size(width, height, self.padding).map(|_| ())
    }

    fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        let border = self.padding.saturating_mul(2);
        (width.saturating_add(border), height.saturating_add(border))
    }

    fn apply(&self, source: RasterBuffer) -> BleedResult<RasterBuffer> {
        bleed::add_bleed_solid(&source, self.padding, self.color)
    }

    fn clone_box(&self) -> Box<dyn RasterStage> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::corners::Marker;

    #[test]
    fn test_stage_metadata() {
        let metadata = ExtendSides::describe();
        assert_eq!(metadata.id, "extend_sides");
        assert_eq!(metadata.category, Category::Reconstruct);
        assert!(metadata.uses_control);

        let metadata = SolidBleed::describe();
        assert_eq!(metadata.parameter_names(), vec!["padding", "color"]);
        assert!(metadata.resizes);
    }

    #[test]
    fn test_sides_validate_rejects_large_control() {
        let stage = ExtendSides::new(Arc::new(RasterBuffer::new(5, 5)));
        assert!(stage.validate(5, 5).is_ok());
        assert!(stage.validate(6, 9).is_ok());
        assert!(stage.validate(4, 5).is_err());
    }

    #[test]
    fn test_corners_validate_requires_same_size() {
        let stage = ExtendCorners::new(Arc::new(RasterBuffer::new(5, 5)));
        assert!(stage.validate(5, 5).is_ok());
        assert!(matches!(
            stage.validate(6, 5),
            Err(BleedError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_corners_stage_fails_without_centers() {
        let mut control = RasterBuffer::new(4, 4);
        control.set_pixel(0, 0, Marker::TARGET);
        let stage = ExtendCorners::new(Arc::new(control));
        let err = stage.apply(RasterBuffer::filled(4, 4, Color::WHITE)).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_bleed_stages_resize() {
        let source = RasterBuffer::filled(3, 2, Color::RED);
        assert_eq!(MirrorBleed::new(2).output_size(3, 2), (7, 6));
        let mirrored = MirrorBleed::new(2).apply(source.clone()).unwrap();
        assert_eq!(mirrored.dimensions(), (7, 6));
        assert_eq!(mirrored.get_pixel(0, 0), Color::RED);

        let solid = SolidBleed::new(1, Color::BLUE).apply(source).unwrap();
        assert_eq!(solid.dimensions(), (5, 4));
        assert_eq!(solid.get_pixel(0, 0), Color::BLUE);
        assert_eq!(solid.get_pixel(1, 1), Color::RED);
    }

    #[test]
    fn test_bleed_stages_reject_oversized_padding() {
        let huge = u32::MAX / 2 + 1;
        assert!(MirrorBleed::new(4).validate(10, 10).is_ok());
        assert!(matches!(
            MirrorBleed::new(huge).validate(4, 4),
            Err(BleedError::PaddingTooLarge { .. })
        ));
        assert!(matches!(
            SolidBleed::new(huge, Color::WHITE).validate(4, 4),
            Err(BleedError::PaddingTooLarge { .. })
        ));
        assert_eq!(MirrorBleed::new(huge).output_size(4, 4), (u32::MAX, u32::MAX));

        let source = RasterBuffer::filled(4, 4, Color::RED);
        assert!(MirrorBleed::new(huge).apply(source.clone()).is_err());
        assert!(SolidBleed::new(u32::MAX, Color::WHITE).apply(source).is_err());
    }
}
