//! Encoded product images.
//!
//! Uploaded images travel as data URIs (`data:<mime>;base64,<payload>`), both
//! inside saved history and when forwarded to the concept generator.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

/// Default upload limit: 2 MiB.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

/// Media type announced for inline image data sent to the generator.
pub const INLINE_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// A size-checked image encoded as a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Encodes raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns `LensError::SizeExceeded` when `bytes` is longer than `limit`.
    /// An image of exactly `limit` bytes is accepted.
    pub fn encode(bytes: &[u8], mime_type: &str, limit: u64) -> Result<Self> {
        check_size(bytes.len() as u64, limit)?;
        let payload = BASE64_STANDARD.encode(bytes);
        Ok(Self(format!("data:{mime_type};base64,{payload}")))
    }

    /// Wraps an already encoded data URI.
    pub fn from_data_uri(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        if !uri.starts_with("data:") || !uri.contains(',') {
            return Err(LensError::validation("Image must be a data URI"));
        }
        Ok(Self(uri))
    }

    /// The full data URI.
    pub fn as_data_uri(&self) -> &str {
        &self.0
    }

    /// The segment after the first comma, i.e. the base64 payload.
    pub fn inline_payload(&self) -> &str {
        self.0.split_once(',').map(|(_, data)| data).unwrap_or("")
    }

    /// Number of bytes the base64 payload decodes to.
    pub fn decoded_len(&self) -> u64 {
        let payload = self.inline_payload().trim_end();
        let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
        ((payload.len() / 4) * 3).saturating_sub(padding) as u64
    }

    /// Media type declared in the data URI header, if any.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.0.split_once(',')?.0;
        let mime = header.strip_prefix("data:")?.split(';').next()?;
        (!mime.is_empty()).then_some(mime)
    }
}

/// Rejects sizes strictly greater than `limit`.
pub fn check_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(LensError::SizeExceeded { size, limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_data_uri() {
        let image = EncodedImage::encode(b"abc", "image/png", DEFAULT_MAX_IMAGE_BYTES).unwrap();
        assert_eq!(image.as_data_uri(), "data:image/png;base64,YWJj");
        assert_eq!(image.inline_payload(), "YWJj");
        assert_eq!(image.mime_type(), Some("image/png"));
    }

    #[test]
    fn test_limit_is_inclusive() {
        let exact = vec![0u8; DEFAULT_MAX_IMAGE_BYTES as usize];
        assert!(EncodedImage::encode(&exact, "image/jpeg", DEFAULT_MAX_IMAGE_BYTES).is_ok());

        let over = vec![0u8; DEFAULT_MAX_IMAGE_BYTES as usize + 1];
        let err = EncodedImage::encode(&over, "image/jpeg", DEFAULT_MAX_IMAGE_BYTES).unwrap_err();
        assert_eq!(
            err,
            LensError::SizeExceeded {
                size: 2_097_153,
                limit: 2_097_152
            }
        );
    }

    #[test]
    fn test_decoded_len_accounts_for_padding() {
        for len in [0usize, 1, 2, 3, 4, 5] {
            let image = EncodedImage::encode(&vec![7u8; len], "image/png", 16).unwrap();
            assert_eq!(image.decoded_len(), len as u64);
        }
    }

    #[test]
    fn test_from_data_uri_rejects_plain_text() {
        assert!(EncodedImage::from_data_uri("not an image").is_err());
        let image = EncodedImage::from_data_uri("data:image/webp;base64,AAAA").unwrap();
        assert_eq!(image.inline_payload(), "AAAA");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let image = EncodedImage::from_data_uri("data:image/jpeg;base64,AA==").unwrap();
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"data:image/jpeg;base64,AA==\"");
    }
}
