//! Generated concepts and the generator contract.

pub mod generator;
pub mod model;

pub use generator::{ConceptGenerator, GenerationError, GenerationRequest};
pub use model::{Concept, ConceptDraft, GeneratedConcepts, GroundingSource, assign_concept_ids};
