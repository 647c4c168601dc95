use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::domain::error::DomainError;
use crate::domain::image_payload::DEFAULT_IMAGE_MIME;
use crate::domain::ports::{ImageBytes, ImageFetcher};

/// Downloads provider-hosted images.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<ImageBytes, DomainError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = %e, url, "image download failed");
            DomainError::generation(format!("failed to download image: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, url, "image download returned an error status");
            return Err(DomainError::generation(format!(
                "image download returned HTTP {status}"
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| DEFAULT_IMAGE_MIME.to_owned(), ToOwned::to_owned);

        let bytes = response.bytes().await.map_err(|e| {
            error!(error = %e, url, "failed to read image body");
            DomainError::generation(format!("failed to read image body: {e}"))
        })?;
        if bytes.is_empty() {
            return Err(DomainError::generation("downloaded image is empty"));
        }

        debug!(url, size = bytes.len(), %mime_type, "image downloaded");
        Ok(ImageBytes { bytes, mime_type })
    }
}
