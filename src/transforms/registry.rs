//! Stage registry: the catalogue of available stages, used for listings and lookups.

use crate::core::stage::{Category, StageMetadata};
use indexmap::IndexMap;

/// Registry for all available stage types.
///
/// Stages are kept in registration order so listings are stable.
pub struct StageRegistry {
    /// Stages indexed by their unique ID.
    stages: IndexMap<String, StageMetadata>,
    /// Stage IDs grouped by category.
    categories: IndexMap<Category, Vec<String>>,
}

impl StageRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            stages: IndexMap::new(),
            categories: IndexMap::new(),
        }
    }

    /// Create a registry pre-populated with built-in stages.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::transforms::stages::register(&mut registry);
        registry
    }

    /// Register a stage type. Re-registering an ID replaces its metadata.
    pub fn register(&mut self, metadata: StageMetadata) {
        let id = metadata.id.clone();
        let category = metadata.category;

        if let Some(previous) = self.stages.insert(id.clone(), metadata) {
            if let Some(ids) = self.categories.get_mut(&previous.category) {
                ids.retain(|i| i != &id);
            }
        }

        self.categories.entry(category).or_default().push(id);
    }

    /// Get metadata for a stage.
    pub fn get_metadata(&self, id: &str) -> Option<&StageMetadata> {
        self.stages.get(id)
    }

    /// Check if a stage is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.stages.contains_key(id)
    }

    /// Get all registered stage IDs.
    pub fn stage_ids(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(|s| s.as_str())
    }

    /// Get stages by category.
    pub fn stages_by_category(&self, category: &Category) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|ids| ids.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Search stages by id, name or description.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.stages
            .iter()
            .filter(|(_, metadata)| {
                metadata.id.to_lowercase().contains(&query)
                    || metadata.name.to_lowercase().contains(&query)
                    || metadata.description.to_lowercase().contains(&query)
            })
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Metadata grouped by category, in category display order.
    pub fn grouped_by_category(&self) -> Vec<(Category, Vec<&StageMetadata>)> {
        Category::all()
            .iter()
            .filter_map(|category| {
                let stages: Vec<_> = self
                    .stages_by_category(category)
                    .into_iter()
                    .filter_map(|id| self.stages.get(id))
                    .collect();
                (!stages.is_empty()).then_some((*category, stages))
            })
            .collect()
    }

    /// Get the total number of registered stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
