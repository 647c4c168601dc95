use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::ports::ObjectStorage;

/// Discards uploads and hands back `{base_url}/{path}`.
#[derive(Debug, Clone)]
pub struct MockStorage {
    base_url: String,
}

impl MockStorage {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn upload_from_buffer(
        &self,
        bytes: Bytes,
        path: &str,
        mime_type: &str,
    ) -> Result<String, DomainError> {
        if path.is_empty() {
            return Err(DomainError::storage("empty object path"));
        }
        debug!(path, mime_type, size = bytes.len(), "mock upload");
        Ok(format!("{}/{}", self.base_url, path.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_url_from_base_and_path() {
        let storage = MockStorage::new("http://localhost:8080/uploads/");
        let url = storage
            .upload_from_buffer(Bytes::from_static(b"png"), "objects/u/1.png", "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/uploads/objects/u/1.png");
    }
}
