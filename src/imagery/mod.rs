//! Image Request Client: one generated image per recipe prompt.
//!
//! This call never fails outward. Any failure (transport, service error, a
//! response without an inline image) degrades to the fixed placeholder, with
//! the detail logged.

use tracing::{debug, warn};

use crate::client::{
    Content, DynGenAiClient, GenerateContentRequest, GenerationConfig, ImageConfig,
};
use crate::config::ModelSettings;

/// Fallback shown when image generation fails. Resolved image references are
/// always either a data URI or this URL, never empty.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://picsum.photos/400/400";

fn style_prompt(prompt: &str) -> String {
    format!(
        "A highly appetizing, home-style Chinese healthy dish for seniors: {prompt}. \
         Bright, soft natural lighting, elegant ceramic dish, looks warm and delicious. \
         Avoid high contrast or cluttered backgrounds."
    )
}

pub async fn fetch_recipe_image(
    client: &DynGenAiClient,
    models: &ModelSettings,
    prompt: &str,
) -> String {
    let request = GenerateContentRequest {
        model: models.image.clone(),
        contents: vec![Content::user_text(style_prompt(prompt))],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: "1:1".to_string(),
            }),
            ..GenerationConfig::default()
        }),
    };

    match client.generate_content(request).await {
        Ok(response) => match response.first_inline_data() {
            Some(inline) => {
                debug!(mime = %inline.mime_type, "recipe image generated");
                format!("data:image/png;base64,{}", inline.data)
            }
            None => {
                warn!(prompt, "image response carried no inline data, using placeholder");
                PLACEHOLDER_IMAGE_URL.to_string()
            }
        },
        Err(error) => {
            warn!(%error, prompt, "image generation failed, using placeholder");
            PLACEHOLDER_IMAGE_URL.to_string()
        }
    }
}
