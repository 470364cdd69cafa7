//! Concept domain models.

use serde::{Deserialize, Serialize};

/// One creative direction produced by the generator.
///
/// Concepts are immutable once created. The `id` is assigned locally when the
/// generator's response is received, never taken from the remote payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub prompt: String,
}

/// A concept as returned by the generator, before it has an id.
///
/// All four fields are required; a response item missing any of them is a
/// schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDraft {
    pub category: String,
    pub title: String,
    pub description: String,
    pub prompt: String,
}

impl ConceptDraft {
    /// Attaches an id, producing the final concept.
    pub fn into_concept(self, id: impl Into<String>) -> Concept {
        Concept {
            id: id.into(),
            category: self.category,
            title: self.title,
            description: self.description,
            prompt: self.prompt,
        }
    }
}

/// Assigns `concept-{received_at_ms}-{index}` ids to a batch of drafts,
/// preserving their order.
pub fn assign_concept_ids(drafts: Vec<ConceptDraft>, received_at_ms: i64) -> Vec<Concept> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| draft.into_concept(format!("concept-{received_at_ms}-{index}")))
        .collect()
}

/// A citation returned when the generator researched the product online.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroundingSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl GroundingSource {
    /// Builds a source from raw citation fields.
    ///
    /// Returns `None` unless `uri` is non-empty. A missing or empty title
    /// falls back to the uri.
    pub fn from_citation(title: Option<&str>, uri: Option<&str>) -> Option<Self> {
        let uri = uri.map(str::trim).filter(|u| !u.is_empty())?;
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(uri);
        Some(Self {
            title: Some(title.to_string()),
            uri: Some(uri.to_string()),
        })
    }

    /// Text to show for the link.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("View Source")
    }
}

/// Concept drafts and citations returned by one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedConcepts {
    pub drafts: Vec<ConceptDraft>,
    pub sources: Vec<GroundingSource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> ConceptDraft {
        ConceptDraft {
            category: "Situational Action".to_string(),
            title: title.to_string(),
            description: "desc".to_string(),
            prompt: "prompt".to_string(),
        }
    }

    #[test]
    fn test_assign_concept_ids_keeps_order() {
        let concepts = assign_concept_ids(vec![draft("a"), draft("b"), draft("c")], 1700);
        let ids: Vec<_> = concepts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["concept-1700-0", "concept-1700-1", "concept-1700-2"]);
        assert_eq!(concepts[1].title, "b");
    }

    #[test]
    fn test_grounding_source_requires_uri() {
        assert!(GroundingSource::from_citation(Some("Title"), None).is_none());
        assert!(GroundingSource::from_citation(Some("Title"), Some("  ")).is_none());

        let source = GroundingSource::from_citation(None, Some("https://shop.example")).unwrap();
        assert_eq!(source.title.as_deref(), Some("https://shop.example"));
    }

    #[test]
    fn test_draft_rejects_missing_fields() {
        let result: Result<ConceptDraft, _> =
            serde_json::from_str(r#"{"category":"x","title":"y","description":"z"}"#);
        assert!(result.is_err());
    }
}
