//! Remote services for Lifestyle Lens.

pub mod gemini_concept_generator;
pub mod prompt;
pub mod response;

pub use gemini_concept_generator::GeminiConceptGenerator;
