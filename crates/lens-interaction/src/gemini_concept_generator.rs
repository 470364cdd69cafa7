//! GeminiConceptGenerator - REST implementation of the concept generator.
//!
//! One `generateContent` call per generation. Product research is delegated
//! to Gemini's `google_search` tool when a product URL is present.

use std::time::Duration;

use async_trait::async_trait;
use lens_core::concept::{ConceptGenerator, GeneratedConcepts, GenerationError, GenerationRequest};
use lens_core::config::{DEFAULT_GEMINI_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, GeneratorConfig};
use lens_core::product::INLINE_IMAGE_MIME_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::prompt;
use crate::response::{map_http_error, parse_generate_response, parse_retry_after};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Concept generator backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiConceptGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiConceptGenerator {
    /// Creates a generator with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Creates a generator from the `[generator]` config section.
    ///
    /// A blank model name falls back to the default model.
    pub fn from_config(api_key: impl Into<String>, config: &GeneratorConfig) -> Self {
        let model = if config.model.trim().is_empty() {
            DEFAULT_GEMINI_MODEL
        } else {
            config.model.trim()
        };
        Self::new(api_key, model).with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Points the generator at another endpoint root, e.g. a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The key travels in a header so it never shows up in URLs or errors.
    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<Value, GenerationError> {
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                GenerationError::Network(format!(
                    "Gemini API request failed: {}",
                    err.without_url()
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(parse_retry_after);
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text, retry_after));
        }

        let text = response.text().await.map_err(|err| {
            GenerationError::Network(format!(
                "Failed to read Gemini response: {}",
                err.without_url()
            ))
        })?;
        serde_json::from_str(&text)
            .map_err(|err| GenerationError::Schema(format!("Gemini response is not JSON: {err}")))
    }
}

#[async_trait]
impl ConceptGenerator for GeminiConceptGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedConcepts, GenerationError> {
        let body = build_request(request)?;
        tracing::debug!(
            "[Gemini] generateContent model={} search={} image={}",
            self.model,
            !body.tools.is_empty(),
            request.product.product_image.is_some()
        );

        let payload = self.send_request(&body).await?;
        let generated = parse_generate_response(&payload)?;
        tracing::info!(
            "[Gemini] Received {} concept(s), {} source(s)",
            generated.drafts.len(),
            generated.sources.len()
        );
        Ok(generated)
    }
}

/// Assembles the request body for `request`.
fn build_request(request: &GenerationRequest) -> Result<GenerateContentRequest, GenerationError> {
    let product = &request.product;
    let instruction = prompt::system_instruction(product)
        .map_err(|err| GenerationError::InvalidRequest(format!("system instruction: {err}")))?;

    let mut parts = vec![Part::Text {
        text: prompt::user_prompt(request),
    }];
    if let Some(image) = &product.product_image {
        parts.push(Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: INLINE_IMAGE_MIME_TYPE.to_string(),
                data: image.inline_payload().to_string(),
            },
        });
    }

    let tools = if product.has_research_url() {
        vec![Tool::default()]
    } else {
        Vec::new()
    };

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text { text: instruction }],
        },
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: prompt::response_schema(),
        },
        tools,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Serialize, Default)]
struct Tool {
    google_search: GoogleSearchTool,
}

#[derive(Serialize, Default)]
struct GoogleSearchTool {}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_core::product::{EncodedImage, ProductDescriptor};
    use serde_json::json;

    fn body_json(request: &GenerationRequest) -> Value {
        serde_json::to_value(build_request(request).unwrap()).unwrap()
    }

    #[test]
    fn test_request_without_url_has_no_tools() {
        let product = ProductDescriptor {
            name: "Lamp".to_string(),
            ..Default::default()
        };
        let body = body_json(&GenerationRequest::new(product));

        assert!(body.get("tools").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(body["systemInstruction"].get("role").is_none());
        assert!(
            body["systemInstruction"]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("Lifestyle campaign")
        );
    }

    #[test]
    fn test_request_with_url_enables_search() {
        let product = ProductDescriptor {
            url: "https://shop.example/lamp".to_string(),
            ..Default::default()
        };
        let body = body_json(&GenerationRequest::new(product));
        assert_eq!(body["tools"], json!([{ "google_search": {} }]));
    }

    #[test]
    fn test_blank_url_does_not_enable_search() {
        let product = ProductDescriptor {
            name: "Lamp".to_string(),
            url: "   ".to_string(),
            ..Default::default()
        };
        let body = body_json(&GenerationRequest::new(product));
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_image_sent_as_inline_jpeg_payload() {
        let product = ProductDescriptor {
            product_image: Some(EncodedImage::from_data_uri("data:image/png;base64,AAAA").unwrap()),
            ..Default::default()
        };
        let body = body_json(&GenerationRequest::new(product));
        assert_eq!(
            body["contents"][0]["parts"][1],
            json!({ "inlineData": { "mimeType": "image/jpeg", "data": "AAAA" } })
        );
    }

    #[test]
    fn test_from_config_blank_model_uses_default() {
        let config = GeneratorConfig {
            model: " ".to_string(),
            timeout_secs: 5,
        };
        let generator = GeminiConceptGenerator::from_config("key", &config);
        assert_eq!(generator.model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(generator.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let generator = GeminiConceptGenerator::new("key", "model")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let request = GenerationRequest::new(ProductDescriptor {
            name: "Lamp".to_string(),
            ..Default::default()
        });

        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::Network(_)));
    }

    #[test]
    fn test_endpoint_does_not_carry_api_key() {
        let generator = GeminiConceptGenerator::new("SECRET-KEY-123", "gemini-2.5-flash")
            .with_base_url("http://127.0.0.1:9/");
        assert_eq!(
            generator.endpoint(),
            "http://127.0.0.1:9/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_network_error_does_not_expose_api_key() {
        let generator = GeminiConceptGenerator::new("SECRET-KEY-123", "model")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let request = GenerationRequest::new(ProductDescriptor {
            name: "Lamp".to_string(),
            ..Default::default()
        });

        let err = generator.generate(&request).await.unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
    }
}
