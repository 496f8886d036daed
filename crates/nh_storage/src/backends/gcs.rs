use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nh_core::{Error, ObjectStore, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use url::Url;

const GCS_BASE_URL: &str = "https://storage.googleapis.com";

/// Google Cloud Storage through its JSON API.
pub struct GcsStore {
    client: Client,
    base_url: Url,
    bucket: String,
    access_token: Option<String>,
}

impl fmt::Debug for GcsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcsStore")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .field("bucket", &self.bucket)
            .field("access_token", &self.access_token.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GcsStore {
    pub fn new(bucket: String, access_token: Option<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(GCS_BASE_URL, bucket, access_token, timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        bucket: String,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid storage URL {}: {}", base_url, e)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            bucket,
            access_token,
        })
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Storage URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.bucket.as_str(), "o"])
            .push(key);
        Ok(url)
    }

    fn upload_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Storage URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["upload", "storage", "v1", "b", self.bucket.as_str(), "o"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    fn name(&self) -> &str {
        "gcs"
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let response = self.authorize(self.client.get(self.object_url(key)?)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(Error::Storage(format!("gs://{}/{} metadata returned status {}", self.bucket, key, s))),
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let mut url = self.object_url(key)?;
        url.query_pairs_mut().append_pair("alt", "media");
        let response = self.authorize(self.client.get(url)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!("gs://{}/{}", self.bucket, key))),
            s if s.is_success() => Ok(response.bytes().await?.to_vec()),
            s => Err(Error::Storage(format!("gs://{}/{} download returned status {}", self.bucket, key, s))),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let size = bytes.len();
        let response = self
            .authorize(self.client.post(self.upload_url(key)?))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Storage(format!(
                "gs://{}/{} upload returned status {}",
                self.bucket,
                key,
                response.status()
            )));
        }
        tracing::info!("☁️ Uploaded {} bytes to gs://{}/{}", size, self.bucket, key);
        Ok(())
    }
}
