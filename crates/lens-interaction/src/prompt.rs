//! Prompt construction for concept generation.

use lens_core::concept::GenerationRequest;
use lens_core::product::{AssetType, ProductDescriptor};
use minijinja::{Environment, context};
use serde_json::{Value, json};

/// Opening the product prompt must carry whenever a source image is attached.
pub const SOURCE_IMAGE_RULE: &str = "Using the uploaded source image as the absolute physical reference for the product, maintaining the exact physical form, geometry, and mechanical openings.";

const SYSTEM_INSTRUCTION_TEMPLATE: &str = r#"You are a World-Class Creative Director and Market Research Specialist. Your goal is to generate 5 high-end visual concepts for a {{ asset_type }} campaign.

### SMART RESEARCH MODE:
{% if has_url %}
- A product URL has been provided: {{ url }}.
- MANDATORY: Use your search tool to investigate this product. Extract its materials, technical dimensions, specific safety certifications (e.g. Cut Resistance level), and brand aesthetic.
- Use this research to ensure your concepts are technically accurate for this specific product model.
{% endif %}

### MANDATORY CORE RULES:
- If a Product Image is uploaded, the prompt MUST start with: "{{ source_image_rule }}"
- Materials MUST NEVER pass through solid housings. Only interact via identified openings.

### ASSET TYPE SPECIFIC LOGIC (CRITICAL):
{% if infographic %}
#### FOR INFOGRAPHIC ASSETS:
- OBJECTIVE: Showcase technical specifications, safety features, and mechanical utility based on your research.
- BACKGROUND: Use clean, professional studio environments (solid white, neutral grey, or minimalist workshop).
- COMPOSITION: Focus on macro close-ups of specific features.
- VISUAL STYLE: Use "Diagrammatic lighting," "Exploded view," or "Technical cross-section" terminology.
- PROMPT FOCUS: Research the {{ name }} specs. Describe shots that highlight materials discovered in research.
{% else %}
#### FOR LIFESTYLE ASSETS:
- OBJECTIVE: Human behavior and use-cases discovered from the product listing research.
- COMPOSITION: Action shots, people interacting with the product in real-world settings.
- MOOD: Narrative-driven, cinematic, and situational.
{% endif %}

### OUTPUT REQUIREMENTS (JSON):
1. category: e.g., 'Technical Breakdown' (for Infographic), 'Situational Action' (for Lifestyle).
2. title: Professional marketing title.
3. description: Explain the design logic and how your research into {{ research_subject }} informed this choice.
4. prompt: A detailed 8K prompt for AI generation including the Source Reference, Aspect Ratio Phrasing ("{{ aspect_ratio }}"), and researched technical details.

IMPORTANT: Return valid JSON matching the schema."#;

/// Renders the system instruction for `product`.
pub fn system_instruction(product: &ProductDescriptor) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template("system_instruction", SYSTEM_INSTRUCTION_TEMPLATE)?;

    let research_subject = if product.url.trim().is_empty() {
        "the product"
    } else {
        product.url.as_str()
    };

    env.get_template("system_instruction")?.render(context! {
        asset_type => product.asset_type.to_string(),
        has_url => product.has_research_url(),
        url => product.url.trim(),
        infographic => product.asset_type == AssetType::Infographic,
        name => product.name.as_str(),
        research_subject => research_subject,
        aspect_ratio => product.aspect_ratio.to_string(),
        source_image_rule => SOURCE_IMAGE_RULE,
    })
}

/// Builds the user-turn text describing the product and any refinement.
pub fn user_prompt(request: &GenerationRequest) -> String {
    let product = &request.product;
    let mut lines = vec![
        format!("Product: {}", product.name),
        format!("URL: {}", product.url),
        format!("Asset Type: {}", product.asset_type),
        format!("User Details: {}", product.specific_details),
        format!("Theme: {}", product.theme),
        format!("Ratio: {}", product.aspect_ratio),
    ];
    if let Some(refinement) = &request.refinement {
        lines.push(String::new());
        lines.push(format!("REFINEMENT REQUEST: {refinement}"));
    }
    lines.push(String::new());
    lines.push(format!(
        "Research the product details from the URL provided and generate 5 distinct {} concepts.",
        product.asset_type
    ));
    lines.join("\n")
}

/// Schema the model's JSON answer must follow.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "concepts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "prompt": { "type": "STRING" }
                    },
                    "required": ["category", "title", "description", "prompt"]
                }
            }
        },
        "required": ["concepts"]
    })
}
