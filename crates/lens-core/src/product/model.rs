//! Product descriptor domain models.
//!
//! The descriptor is everything the user tells us about the product being
//! marketed. Field names serialize in camelCase so saved history stays
//! compatible with the `lifestyle_lens_history` payload format.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::image::EncodedImage;

/// Kind of marketing asset the concepts should target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum AssetType {
    /// People using the product in real-world settings.
    #[default]
    Lifestyle,
    /// Technical close-ups, specs and diagrammatic shots.
    Infographic,
}

/// Output aspect ratio requested for the generated imagery.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    #[strum(serialize = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    #[strum(serialize = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    #[strum(serialize = "16:9")]
    Landscape,
    #[serde(rename = "4:5")]
    #[strum(serialize = "4:5")]
    Feed,
}

/// Seasonal theme presets offered alongside the free-text theme field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum SeasonalTheme {
    #[strum(to_string = "Valentine's", serialize = "valentines")]
    Valentines,
    Christmas,
    Summer,
    Minimalist,
}

impl SeasonalTheme {
    /// Human readable label including the mood the theme implies.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valentines => "Valentine's (Romantic & Intimate)",
            Self::Christmas => "Christmas (Cozy & Festive)",
            Self::Summer => "Summer (Energetic & Vacation)",
            Self::Minimalist => "Minimalist Studio",
        }
    }
}

/// Everything the user supplied about the product.
///
/// No field is required by the type itself. Whether a descriptor is usable
/// depends on the operation; see [`ProductDescriptor::has_subject`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    /// Reference image as a data URI, `None` when nothing was uploaded.
    #[serde(rename = "productImageBase64", default)]
    pub product_image: Option<EncodedImage>,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub asset_type: AssetType,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub specific_details: String,
}

impl ProductDescriptor {
    /// Creates an empty descriptor (Lifestyle, 1:1).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether there is anything to generate concepts about: a name, a URL
    /// or an uploaded image.
    pub fn has_subject(&self) -> bool {
        !self.name.trim().is_empty() || self.has_research_url() || self.product_image.is_some()
    }

    /// Whether the URL is non-blank, which switches the generator into
    /// research mode.
    pub fn has_research_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_default_descriptor() {
        let product = ProductDescriptor::new();
        assert_eq!(product.asset_type, AssetType::Lifestyle);
        assert_eq!(product.aspect_ratio, AspectRatio::Square);
        assert!(product.product_image.is_none());
        assert!(!product.has_subject());
    }

    #[test]
    fn test_has_subject_from_any_field() {
        let named = ProductDescriptor {
            name: "Lamp".to_string(),
            ..Default::default()
        };
        assert!(named.has_subject());

        let linked = ProductDescriptor {
            url: "https://example.com/lamp".to_string(),
            ..Default::default()
        };
        assert!(linked.has_subject());
        assert!(linked.has_research_url());

        let blank = ProductDescriptor {
            name: "   ".to_string(),
            url: " ".to_string(),
            ..Default::default()
        };
        assert!(!blank.has_subject());
    }

    #[test]
    fn test_aspect_ratio_wire_names() {
        let json = serde_json::to_string(&AspectRatio::Landscape).unwrap();
        assert_eq!(json, "\"16:9\"");
        assert_eq!(AspectRatio::from_str("4:5").unwrap(), AspectRatio::Feed);
        assert_eq!(AspectRatio::Portrait.to_string(), "9:16");
    }

    #[test]
    fn test_asset_type_parse_is_case_insensitive() {
        assert_eq!(
            AssetType::from_str("infographic").unwrap(),
            AssetType::Infographic
        );
        assert!(AssetType::from_str("poster").is_err());
    }

    #[test]
    fn test_descriptor_wire_format() {
        let product = ProductDescriptor {
            name: "Lamp".to_string(),
            specific_details: "brass hinge".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["name"], "Lamp");
        assert_eq!(value["productImageBase64"], serde_json::Value::Null);
        assert_eq!(value["assetType"], "Lifestyle");
        assert_eq!(value["aspectRatio"], "1:1");
        assert_eq!(value["specificDetails"], "brass hinge");
    }

    #[test]
    fn test_seasonal_theme_catalogue() {
        let themes: Vec<_> = SeasonalTheme::iter().collect();
        assert_eq!(themes.len(), 4);
        assert_eq!(SeasonalTheme::Valentines.to_string(), "Valentine's");
        assert_eq!(
            SeasonalTheme::from_str("christmas").unwrap().label(),
            "Christmas (Cozy & Festive)"
        );
    }
}
