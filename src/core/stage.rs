//! RasterStage trait and stage metadata.
//!
//! A stage is one transform with its configuration already bound, ready to be
//! chained by a [`Pipeline`](crate::execution::pipeline::Pipeline). Stages never
//! call each other; the pipeline hands each one the previous stage's output.

use crate::core::error::BleedResult;
use crate::core::types::RasterBuffer;
use std::fmt;

/// Category for grouping stages in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Rebuilds missing pixels inside the image bounds
    #[default]
    Reconstruct,
    /// Grows the canvas outward
    Bleed,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Reconstruct => "Reconstruct",
            Category::Bleed => "Bleed",
        }
    }

    /// Get all categories in display order.
    pub fn all() -> &'static [Category] {
        &[Category::Reconstruct, Category::Bleed]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A configurable setting of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    pub description: String,
    /// Default value as written in a configuration file, if optional.
    pub default_value: Option<String>,
}

impl ParameterInfo {
    /// A parameter that must always be given.
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default_value: None,
        }
    }

    /// A parameter with a default.
    pub fn optional(
        name: impl Into<String>,
        description: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default_value: Some(default_value.into()),
        }
    }
}

/// Metadata describing a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMetadata {
    /// Unique identifier, also the `kind` used in configuration files (e.g., "mirror_bleed")
    pub id: String,
    /// Human-readable name (e.g., "Mirrored Bleed")
    pub name: String,
    pub category: Category,
    pub description: String,
    pub parameters: Vec<ParameterInfo>,
    /// Whether the stage reads a control image
    pub uses_control: bool,
    /// Whether the output dimensions differ from the input
    pub resizes: bool,
}

impl StageMetadata {
    /// Create a new metadata builder.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> StageMetadataBuilder {
        StageMetadataBuilder::new(id, name)
    }

    /// Get all parameter names.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Find a parameter by name.
    pub fn get_parameter(&self, name: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Builder for StageMetadata.
pub struct StageMetadataBuilder {
    id: String,
    name: String,
    category: Category,
    description: String,
    parameters: Vec<ParameterInfo>,
    uses_control: bool,
    resizes: bool,
}

impl StageMetadataBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::default(),
            description: String::new(),
            parameters: Vec::new(),
            uses_control: false,
            resizes: false,
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn parameter(mut self, param: ParameterInfo) -> Self {
        self.parameters.push(param);
        self
    }

    /// Mark as reading a control image; adds the `control` parameter.
    pub fn uses_control(mut self) -> Self {
        self.uses_control = true;
        self.parameters.push(ParameterInfo::required(
            "control",
            "Path to the control image",
        ));
        self
    }

    /// Mark as changing the image dimensions.
    pub fn resizes(mut self) -> Self {
        self.resizes = true;
        self
    }

    /// Build the metadata.
    pub fn build(self) -> StageMetadata {
        StageMetadata {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            parameters: self.parameters,
            uses_control: self.uses_control,
            resizes: self.resizes,
        }
    }
}

/// The core trait for pipeline stages.
///
/// # Design
///
/// Stages use a two-phase design:
///
/// 1. **Validation** (`validate`): called with the source dimensions before
///    any pixel work, so a mis-sized control image fails a batch early.
/// 2. **Application** (`apply`): consumes the buffer and returns the
///    transformed one, which may have different dimensions.
///
/// `Send + Sync` lets one pipeline be shared by every worker of a batch.
pub trait RasterStage: Send + Sync {
    /// Get the metadata for this stage.
    fn metadata(&self) -> StageMetadata;

    /// Check that the stage can run on a `width` x `height` source.
    fn validate(&self, _width: u32, _height: u32) -> BleedResult<()> {
        Ok(())
    }

    /// Dimensions of the output for a `width` x `height` input.
    fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width, height)
    }

    /// Transform the buffer.
    fn apply(&self, source: RasterBuffer) -> BleedResult<RasterBuffer>;

    /// Clone this stage into a boxed trait object.
    fn clone_box(&self) -> Box<dyn RasterStage>;
}

// Allow cloning Box<dyn RasterStage>
impl Clone for Box<dyn RasterStage> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Debug for dyn RasterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterStage")
            .field("id", &self.metadata().id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let metadata = StageMetadata::builder("test_stage", "Test Stage")
            .category(Category::Bleed)
            .description("A test stage")
            .parameter(ParameterInfo::optional("padding", "Border width", "0"))
            .uses_control()
            .resizes()
            .build();

        assert_eq!(metadata.id, "test_stage");
        assert_eq!(metadata.name, "Test Stage");
        assert_eq!(metadata.category, Category::Bleed);
        assert_eq!(metadata.parameter_names(), vec!["padding", "control"]);
        assert!(metadata.uses_control);
        assert!(metadata.resizes);
        assert_eq!(
            metadata.get_parameter("padding").unwrap().default_value.as_deref(),
            Some("0")
        );
        assert!(metadata.get_parameter("control").unwrap().default_value.is_none());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Bleed.display_name(), "Bleed");
        assert_eq!(Category::Reconstruct.to_string(), "Reconstruct");
        assert_eq!(Category::all().len(), 2);
    }
}
