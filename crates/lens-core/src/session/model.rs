//! Transient working session.

use crate::concept::{Concept, GroundingSource};
use crate::history::SavedProject;
use crate::product::ProductDescriptor;

/// The unsaved state of the product currently being worked on.
///
/// Created empty at startup or on "new project", mutated by edits and by
/// generation results. Nothing here is persisted unless explicitly saved to
/// the history store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub product: ProductDescriptor,
    pub concepts: Vec<Concept>,
    pub grounding_sources: Vec<GroundingSource>,
    /// Feedback waiting to be sent with the next refinement request.
    pub refinement: String,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session around an existing descriptor.
    pub fn with_product(product: ProductDescriptor) -> Self {
        Self {
            product,
            ..Default::default()
        }
    }

    pub fn has_concepts(&self) -> bool {
        !self.concepts.is_empty()
    }

    /// Replaces the current results with a new batch.
    pub fn apply_results(&mut self, concepts: Vec<Concept>, sources: Vec<GroundingSource>) {
        self.concepts = concepts;
        self.grounding_sources = sources;
    }

    /// Restores descriptor and results from a saved project.
    ///
    /// The pending refinement text is left as it is.
    pub fn restore(&mut self, project: &SavedProject) {
        self.product = project.product.clone();
        self.concepts = project.concepts.clone();
        self.grounding_sources = project.grounding_sources.clone();
    }

    /// Resets everything to the empty defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
