//! Decoding of Gemini `generateContent` responses into concept drafts.

use std::time::Duration;

use lens_core::concept::{ConceptDraft, GeneratedConcepts, GenerationError, GroundingSource};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde_json::Value;

/// Body used when the model answers with no text at all.
const EMPTY_RESPONSE: &str = r#"{"concepts": []}"#;

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(?:json)?\s*").expect("valid leading fence pattern"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```$").expect("valid trailing fence pattern"));

#[derive(Deserialize)]
struct ConceptEnvelope {
    concepts: Vec<ConceptDraft>,
}

/// Decodes a full response payload.
pub fn parse_generate_response(root: &Value) -> Result<GeneratedConcepts, GenerationError> {
    let text = extract_text(root);
    let text = if text.trim().is_empty() {
        EMPTY_RESPONSE.to_string()
    } else {
        text
    };

    Ok(GeneratedConcepts {
        drafts: parse_concept_drafts(&text)?,
        sources: extract_grounding_sources(root),
    })
}

/// Removes a surrounding markdown code fence, if any.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let without_leading = LEADING_FENCE.replace(trimmed, "");
    TRAILING_FENCE.replace(&without_leading, "").into_owned()
}

/// Parses the model's JSON answer, rejecting items with missing fields.
pub fn parse_concept_drafts(text: &str) -> Result<Vec<ConceptDraft>, GenerationError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str::<ConceptEnvelope>(&cleaned)
        .map(|envelope| envelope.concepts)
        .map_err(|err| GenerationError::Schema(err.to_string()))
}

/// Concatenates the text parts of the first candidate.
fn extract_text(root: &Value) -> String {
    root.get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Citations from the first candidate's grounding metadata.
///
/// Chunks without a uri are dropped; duplicates are kept in response order.
pub fn extract_grounding_sources(root: &Value) -> Vec<GroundingSource> {
    let Some(chunks) = root
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("groundingMetadata"))
        .and_then(|metadata| metadata.get("groundingChunks"))
        .and_then(|chunks| chunks.as_array())
    else {
        return Vec::new();
    };

    chunks
        .iter()
        .filter_map(|chunk| {
            let web = chunk.get("web")?;
            GroundingSource::from_citation(
                web.get("title").and_then(|v| v.as_str()),
                web.get("uri").and_then(|v| v.as_str()),
            )
        })
        .collect()
}

/// Converts a non-success response into a generation error.
pub fn map_http_error(
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> GenerationError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        return match retry_after {
            Some(delay) => {
                GenerationError::Quota(format!("{message} (retry after {}s)", delay.as_secs()))
            }
            None => GenerationError::Quota(message),
        };
    }

    GenerationError::Rejected {
        status: status.as_u16(),
        message,
    }
}

pub fn parse_retry_after(header: &HeaderValue) -> Option<Duration> {
    let value = header.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
