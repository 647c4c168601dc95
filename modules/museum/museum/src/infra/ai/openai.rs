//! OpenAI-compatible HTTP adapters.
//!
//! Both generators share one `reqwest::Client` built with the configured
//! timeout. Failures are logged here and surfaced as `Generation` errors.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, instrument};

use crate::config::AiConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::{
    GeneratedImage, ImageGenerator, ImageOptions, TextGenerator, TextOptions,
};

#[derive(Clone)]
struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenAiClient {
    fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("museum.ai.api_key is not set"))?;
        let http = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, DomainError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, %url, "OpenAI request failed");
                DomainError::generation(format!("request to {path} failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(%status, body = %text, %url, "OpenAI returned an error status");
            return Err(DomainError::generation(format!("{path} returned HTTP {status}")));
        }

        response.json::<Value>().await.map_err(|e| {
            error!(error = %e, %url, "OpenAI response is not JSON");
            DomainError::generation(format!("invalid response from {path}: {e}"))
        })
    }
}

/// Chat completions text generator.
#[derive(Clone)]
pub struct OpenAiTextGenerator {
    client: OpenAiClient,
    model: String,
    default_max_tokens: u32,
}

impl OpenAiTextGenerator {
    /// # Errors
    /// Fails when no API key is configured or the HTTP client cannot be built.
    pub fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: OpenAiClient::new(cfg)?,
            model: cfg.text_model.clone(),
            default_max_tokens: cfg.max_tokens,
        })
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    #[instrument(skip(self, prompt, options), fields(model = %self.model, json_mode = options.json_mode))]
    async fn generate_text(
        &self,
        prompt: &str,
        options: &TextOptions,
    ) -> Result<String, DomainError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": options.max_tokens.unwrap_or(self.default_max_tokens),
        });
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        if options.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let raw = self.client.post("/chat/completions", &body).await?;
        let completion: ChatCompletion = serde_json::from_value(raw).map_err(|e| {
            error!(error = %e, "unexpected chat completion shape");
            DomainError::generation(format!("unexpected chat completion shape: {e}"))
        })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| DomainError::generation("no text in chat completion"))?;
        debug!(chars = text.len(), "text generated");
        Ok(text)
    }
}

/// Images API generator; asks for transparent backgrounds.
#[derive(Clone)]
pub struct OpenAiImageGenerator {
    client: OpenAiClient,
    model: String,
}

impl OpenAiImageGenerator {
    /// # Errors
    /// Fails when no API key is configured or the HTTP client cannot be built.
    pub fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: OpenAiClient::new(cfg)?,
            model: cfg.image_model.clone(),
        })
    }
}

#[derive(Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: Option<String>,
    b64_json: Option<String>,
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, size = %options.size))]
    async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<Vec<GeneratedImage>, DomainError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "n": options.count,
            "size": options.size,
            "background": "transparent",
        });

        let raw = self.client.post("/images/generations", &body).await?;
        let response: ImagesResponse = serde_json::from_value(raw).map_err(|e| {
            error!(error = %e, "unexpected images response shape");
            DomainError::generation(format!("unexpected images response shape: {e}"))
        })?;

        let images: Vec<GeneratedImage> = response
            .data
            .into_iter()
            .filter_map(|d| match (d.b64_json, d.url) {
                (Some(b64), _) if !b64.is_empty() => Some(GeneratedImage::Inline(b64)),
                (_, Some(url)) if !url.is_empty() => Some(GeneratedImage::Url(url)),
                _ => None,
            })
            .collect();

        if images.is_empty() {
            return Err(DomainError::generation("no image data in response"));
        }
        debug!(count = images.len(), "images generated");
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config(base_url: String) -> AiConfig {
        AiConfig {
            api_key: Some(SecretString::from("sk-test".to_owned())),
            base_url,
            ..AiConfig::default()
        }
    }

    #[tokio::test]
    async fn text_generator_sends_json_mode_and_system_prompt() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_includes(r#""response_format":{"type":"json_object"}"#)
                .body_includes(r#""max_tokens":500"#)
                .body_includes(r#""role":"system""#);
            then.status(200).json_body(json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"choice\":2}" } }]
            }));
        });

        let generator = OpenAiTextGenerator::new(&config(server.base_url())).unwrap();
        let options = TextOptions {
            temperature: Some(0.7),
            system_prompt: Some("pick a theme".to_owned()),
            json_mode: true,
            max_tokens: Some(500),
        };
        let text = generator.generate_text("answers", &options).await.unwrap();

        assert_eq!(text, "{\"choice\":2}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn text_generator_maps_http_errors() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("rate limited");
        });

        let generator = OpenAiTextGenerator::new(&config(server.base_url())).unwrap();
        let err = generator
            .generate_text("hi", &TextOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Generation(ref m) if m.contains("429")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .json_body(json!({ "choices": [{ "message": { "content": "  " } }] }));
        });

        let generator = OpenAiTextGenerator::new(&config(server.base_url())).unwrap();
        let res = generator.generate_text("hi", &TextOptions::default()).await;
        assert!(matches!(res, Err(DomainError::Generation(_))));
    }

    #[tokio::test]
    async fn image_generator_prefers_inline_data() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/images/generations")
                .body_includes(r#""size":"1024x1024""#)
                .body_includes(r#""background":"transparent""#);
            then.status(200).json_body(json!({
                "data": [
                    { "b64_json": "aGVsbG8=" },
                    { "url": "https://cdn.example/img.png" },
                    {}
                ]
            }));
        });

        let generator = OpenAiImageGenerator::new(&config(server.base_url())).unwrap();
        let images = generator
            .generate_image("a clock", &ImageOptions::default())
            .await
            .unwrap();

        assert_eq!(
            images,
            vec![
                GeneratedImage::Inline("aGVsbG8=".to_owned()),
                GeneratedImage::Url("https://cdn.example/img.png".to_owned()),
            ]
        );
        mock.assert_async().await;
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let cfg = AiConfig::default();
        assert!(OpenAiTextGenerator::new(&cfg).is_err());
        assert!(OpenAiImageGenerator::new(&cfg).is_err());
    }
}
