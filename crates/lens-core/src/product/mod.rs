//! Product descriptors and the uploaded reference image.

pub mod image;
pub mod model;

pub use image::{DEFAULT_MAX_IMAGE_BYTES, EncodedImage, INLINE_IMAGE_MIME_TYPE, check_size};
pub use model::{AspectRatio, AssetType, ProductDescriptor, SeasonalTheme};
