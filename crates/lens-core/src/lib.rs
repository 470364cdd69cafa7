pub mod clock;
pub mod concept;
pub mod config;
pub mod error;
pub mod history;
pub mod product;
pub mod secret;
pub mod session;

// Re-export common error type
pub use error::{LensError, Result};
