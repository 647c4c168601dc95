//! Deterministic generators for local runs and tests.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::onboarding::score_text;
use crate::domain::ports::{
    GeneratedImage, ImageGenerator, ImageOptions, TextGenerator, TextOptions,
};
use crate::domain::prompts::USER_RESPONSES_MARKER;

/// 1x1 transparent PNG.
pub const PLACEHOLDER_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Answers by prompt kind:
/// * JSON-mode theme analysis gets a keyword-scored `{choice, reason}`,
/// * other JSON-mode prompts get commentary followed by object metadata,
/// * everything else gets a follow-up question.
#[derive(Debug, Clone, Default)]
pub struct MockTextGenerator;

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_text(
        &self,
        prompt: &str,
        options: &TextOptions,
    ) -> Result<String, DomainError> {
        if options.json_mode && prompt.contains(USER_RESPONSES_MARKER) {
            let scored = score_text(prompt);
            debug!(choice = scored.choice, "mock theme analysis");
            return Ok(json!({ "choice": scored.choice, "reason": scored.reason }).to_string());
        }

        if options.json_mode {
            let metadata = json!({
                "name": "Generated Object",
                "color": "#C8A27A",
                "description": "Generated object description",
                "onType": "Floor",
                "visual_prompt": "a small wooden keepsake box with brass corners",
            });
            return Ok(format!(
                "[Mock Text Generation]\nHere is the object I imagined:\n{metadata:#}\n"
            ));
        }

        Ok("What color was it, and what was it made of?".to_owned())
    }
}

/// Always returns the inline placeholder PNG, `count` times.
#[derive(Debug, Clone, Default)]
pub struct MockImageGenerator;

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate_image(
        &self,
        _prompt: &str,
        options: &ImageOptions,
    ) -> Result<Vec<GeneratedImage>, DomainError> {
        let count = usize::from(options.count.max(1));
        Ok(vec![
            GeneratedImage::Inline(PLACEHOLDER_PNG_BASE64.to_owned());
            count
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::response_parser::{extract_json_object, string_field};

    #[tokio::test]
    async fn analysis_prompts_get_scored_choice() {
        let generator = MockTextGenerator;
        let options = TextOptions {
            json_mode: true,
            ..TextOptions::default()
        };
        let prompt = format!("{USER_RESPONSES_MARKER}\nQ1: q\nA1: I miss my family");
        let out = generator.generate_text(&prompt, &options).await.unwrap();
        let map = extract_json_object(&out).unwrap();
        assert_eq!(map["choice"], 1);
    }

    #[tokio::test]
    async fn metadata_prompts_get_parseable_json_after_commentary() {
        let generator = MockTextGenerator;
        let options = TextOptions {
            json_mode: true,
            ..TextOptions::default()
        };
        let out = generator.generate_text("describe it", &options).await.unwrap();
        assert!(out.starts_with("[Mock Text Generation]"));
        let map = extract_json_object(&out).unwrap();
        assert_eq!(string_field(&map, "onType"), Some("Floor"));
    }

    #[tokio::test]
    async fn image_mock_returns_inline_png() {
        let images = MockImageGenerator
            .generate_image("x", &ImageOptions::default())
            .await
            .unwrap();
        assert_eq!(
            images,
            vec![GeneratedImage::Inline(PLACEHOLDER_PNG_BASE64.to_owned())]
        );
    }
}
