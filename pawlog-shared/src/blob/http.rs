/// Blob store over HTTP
///
/// Uploads with `PUT {endpoint}/{bucket}/{key}`, which S3-compatible gateways and
/// presigning proxies accept. An optional bearer token is sent with every request.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

use super::{BlobError, BlobStore};

/// Connection settings for [`HttpBlobStore`]
#[derive(Debug, Clone)]
pub struct HttpBlobConfig {
    /// Base URL, e.g. `https://storage.example.com`
    pub endpoint: String,

    pub bucket: String,

    /// Bearer token sent as `Authorization`
    pub token: Option<String>,

    /// Per-request timeout
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(config: HttpBlobConfig) -> Result<Self, BlobError> {
        let bucket = config.bucket.trim_matches('/');
        if bucket.is_empty() {
            return Err(BlobError::Config("bucket must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BlobError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("{}/{}", config.endpoint.trim_end_matches('/'), bucket),
            token: config.token.filter(|t| !t.is_empty()),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, BlobError> {
        let size = bytes.len();
        let mut request = self.client.put(self.object_url(key)).body(bytes);

        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(key, size, "Stored blob");
        Ok(key.to_string())
    }
}
