//! Reads product images from disk.

use std::path::Path;

use lens_core::error::Result;
use lens_core::product::image::check_size;
use lens_core::product::{EncodedImage, INLINE_IMAGE_MIME_TYPE};

/// Loads and encodes the image at `path`.
///
/// The size is checked against `limit` from file metadata before the file is
/// read, so an oversized upload is rejected without loading it. The media type
/// is guessed from the extension and falls back to JPEG.
pub fn load_image_file(path: &Path, limit: u64) -> Result<EncodedImage> {
    let size = std::fs::metadata(path)?.len();
    check_size(size, limit)?;

    let bytes = std::fs::read(path)?;
    let mime_type = guess_image_mime(path);
    tracing::debug!(
        "[Image] Loaded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );
    EncodedImage::encode(&bytes, &mime_type, limit)
}

fn guess_image_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| INLINE_IMAGE_MIME_TYPE.to_string())
}
