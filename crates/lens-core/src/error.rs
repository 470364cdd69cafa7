//! Error types for Lifestyle Lens.

use thiserror::Error;

/// A shared error type for the entire Lens workspace.
///
/// The first group of variants are the conditions a user can run into while
/// working on a product (empty saves, oversized images, failed generations).
/// The second group covers infrastructure failures in the same manner as the
/// rest of the stack: typed variants with automatic conversion via `From`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LensError {
    /// Save attempted on a session that has no concepts yet.
    #[error("Session has no concepts to save")]
    EmptySession,

    /// Persisted history payload could not be parsed.
    #[error("Stored history is corrupt: {0}")]
    StorageCorrupt(String),

    /// The persistent medium has no room for the write.
    #[error("Storage full: {0}")]
    StorageFull(String),

    /// An uploaded image is larger than the configured limit.
    #[error("Image is {size} bytes, limit is {limit} bytes")]
    SizeExceeded { size: u64, limit: u64 },

    /// Input rejected before any remote call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote concept generator failed. The cause is logged, not carried.
    #[error("Concept generation failed")]
    GenerationFailed,

    /// A generation request is already outstanding for this session.
    #[error("A generation request is already in progress")]
    GenerationInProgress,

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LensError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a StorageFull error
    pub fn storage_full(message: impl Into<String>) -> Self {
        Self::StorageFull(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a StorageFull error
    pub fn is_storage_full(&self) -> bool {
        matches!(self, Self::StorageFull(_))
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the short notice shown to the end user.
    ///
    /// Diagnostic detail (paths, parse errors, HTTP bodies) never appears here;
    /// it goes to the log at the point where the error is handled.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptySession => "Generate some concepts before saving a project.".to_string(),
            Self::StorageCorrupt(_) => {
                "Saved history could not be read and was reset.".to_string()
            }
            Self::StorageFull(_) => {
                "Storage full! Try deleting some old projects to save new ones.".to_string()
            }
            Self::SizeExceeded { limit, .. } => format!(
                "Image too large. Please upload an image smaller than {}.",
                format_limit(*limit)
            ),
            Self::Validation(message) => message.clone(),
            Self::GenerationFailed => {
                "Creative direction failed. Please check your connection and try again."
                    .to_string()
            }
            Self::GenerationInProgress => {
                "Still working on the previous request. Please wait for it to finish.".to_string()
            }
            Self::NotFound { entity_type, id } => format!("No {entity_type} found with id '{id}'."),
            Self::Io { .. } | Self::Serialization { .. } | Self::Internal(_) => {
                "Something went wrong. Check the log for details.".to_string()
            }
            Self::Config(message) => format!("Configuration problem: {message}"),
        }
    }
}

fn format_limit(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LensError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::StorageFull {
            return Self::StorageFull(err.to_string());
        }
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LensError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LensError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LensError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LensError>`.
pub type Result<T> = std::result::Result<T, LensError>;
