//! Remote concept generator contract.
//!
//! The generator is an external capability. The application layer only sees
//! this trait; the Gemini implementation lives in `lens-interaction`.

use async_trait::async_trait;
use thiserror::Error;

use super::model::GeneratedConcepts;
use crate::product::ProductDescriptor;

/// Input for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Snapshot of the descriptor at the time the request was issued.
    pub product: ProductDescriptor,
    /// Free-text feedback on the previous batch of concepts.
    pub refinement: Option<String>,
}

impl GenerationRequest {
    pub fn new(product: ProductDescriptor) -> Self {
        Self {
            product,
            refinement: None,
        }
    }

    pub fn with_refinement(mut self, refinement: impl Into<String>) -> Self {
        let refinement = refinement.into();
        self.refinement = (!refinement.trim().is_empty()).then_some(refinement);
        self
    }
}

/// Failure modes of the remote generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Transport failure: DNS, connect, timeout, broken body.
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit or quota exhausted.
    #[error("Quota exceeded: {0}")]
    Quota(String),

    /// The API answered with a non-success status other than a quota error.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be parsed into concepts.
    #[error("Malformed response: {0}")]
    Schema(String),

    /// The request could not be built from the descriptor.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GenerationError {
    /// Whether retrying later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Quota(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Schema(_) | Self::InvalidRequest(_) => false,
        }
    }
}

/// A service that turns a product descriptor into concept drafts.
#[async_trait]
pub trait ConceptGenerator: Send + Sync {
    /// Runs one generation.
    ///
    /// Implementations return drafts in the order the model produced them and
    /// must tolerate more or fewer than five.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GeneratedConcepts, GenerationError>;
}
