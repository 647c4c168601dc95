//! Outbound collaborators consumed by the domain services.
//!
//! Concrete implementations live in `infra` and are chosen once at startup.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::error::DomainError;

/// Options for a single text generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOptions {
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
    pub json_mode: bool,
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// # Errors
    /// [`DomainError::Generation`] when the provider fails or returns nothing.
    async fn generate_text(&self, prompt: &str, options: &TextOptions)
    -> Result<String, DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub size: String,
    pub count: u8,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            size: "1024x1024".to_owned(),
            count: 1,
        }
    }
}

/// One generated image: either hosted by the provider or returned inline as
/// base64 (optionally a `data:` URI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    Url(String),
    Inline(String),
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// # Errors
    /// [`DomainError::Generation`] when the provider fails.
    async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<Vec<GeneratedImage>, DomainError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `path` and returns the public URL. The caller owns
    /// uniqueness of `path`.
    ///
    /// # Errors
    /// [`DomainError::Storage`] when the upload fails.
    async fn upload_from_buffer(
        &self,
        bytes: Bytes,
        path: &str,
        mime_type: &str,
    ) -> Result<String, DomainError>;
}

/// Raw image bytes with their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub bytes: Bytes,
    pub mime_type: String,
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Downloads an image hosted at `url`.
    ///
    /// # Errors
    /// [`DomainError::Generation`] when the download fails.
    async fn fetch(&self, url: &str) -> Result<ImageBytes, DomainError>;
}
