use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, error, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::ports::ObjectStorage;

/// Public-read bucket; URLs use the virtual-hosted style.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
}

impl S3Storage {
    /// Loads credentials from the default AWS provider chain.
    pub async fn new(bucket: String, region: String) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;
        info!(%bucket, %region, "S3 storage initialized");
        Self {
            client: Client::new(&config),
            bucket,
            region,
        }
    }

    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket,
            self.region,
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
    async fn upload_from_buffer(
        &self,
        bytes: Bytes,
        path: &str,
        mime_type: &str,
    ) -> Result<String, DomainError> {
        let key = path.trim_start_matches('/');
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(mime_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, key, "S3 upload failed");
                DomainError::storage(format!("failed to upload {key}: {e}"))
            })?;

        debug!(key, "uploaded to S3");
        Ok(self.public_url(key))
    }
}
