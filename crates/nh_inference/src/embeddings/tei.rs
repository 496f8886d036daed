//! Text Embeddings Inference client.

use std::time::Duration;

use async_trait::async_trait;
use nh_core::{with_timeout, Embedder, Error, Result};
use serde::Serialize;

use super::l2_normalize;

/// Maximum number of texts per /embed call.
const BATCH_SIZE: usize = 64;

#[derive(Debug)]
pub struct TeiEmbedder {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
    normalize: bool,
}

impl TeiEmbedder {
    pub fn new(tei_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: format!("{}/embed", tei_url.trim_end_matches('/')),
            timeout,
        })
    }

    async fn embed_batch(&self, chunk: &[String], normalize: bool) -> Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(&self.url)
            .json(&EmbedRequest { inputs: chunk, normalize })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Inference(format!("TEI returned status {}", response.status())));
        }

        let embeddings: Vec<Vec<f32>> = response.json().await?;
        if embeddings.len() != chunk.len() {
            return Err(Error::Inference(format!(
                "TEI returned {} embeddings for {} inputs",
                embeddings.len(),
                chunk.len()
            )));
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for TeiEmbedder {
    fn name(&self) -> &str {
        "TEI"
    }

    /// Texts go out in batches of [`BATCH_SIZE`]; one vector per text, in input order.
    async fn embed(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let embeddings = with_timeout(self.timeout, "embed", self.embed_batch(chunk, normalize)).await?;
            all_embeddings.extend(embeddings);
        }

        if normalize {
            all_embeddings.iter_mut().for_each(|v| l2_normalize(v));
        }
        tracing::debug!("🔢 Embedded {} texts", all_embeddings.len());
        Ok(all_embeddings)
    }
}
