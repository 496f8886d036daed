use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nh_core::{with_timeout, Error, Result, ZeroShotClassifier, ZeroShotResult};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct Parameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: Parameters<'a>,
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// Hosted inference answers either with parallel arrays or with a list of pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Parallel { labels: Vec<String>, scores: Vec<f32> },
    Pairs(Vec<LabelScore>),
}

impl From<ZeroShotResponse> for ZeroShotResult {
    fn from(response: ZeroShotResponse) -> Self {
        match response {
            ZeroShotResponse::Parallel { labels, scores } => ZeroShotResult { labels, scores },
            ZeroShotResponse::Pairs(mut pairs) => {
                pairs.sort_by(|a, b| b.score.total_cmp(&a.score));
                ZeroShotResult {
                    labels: pairs.iter().map(|p| p.label.clone()).collect(),
                    scores: pairs.iter().map(|p| p.score).collect(),
                }
            }
        }
    }
}

/// Zero-shot classification over a Hugging Face style inference endpoint.
pub struct HfZeroShotClassifier {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for HfZeroShotClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HfZeroShotClassifier")
            .field("url", &self.url)
            .field("token", &self.token.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HfZeroShotClassifier {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.to_string(),
            token,
            timeout,
        })
    }

    async fn request(&self, text: &str, labels: &[&str]) -> Result<ZeroShotResult> {
        let mut request = self.client.post(&self.url).json(&ZeroShotRequest {
            inputs: text,
            parameters: Parameters {
                candidate_labels: labels,
            },
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::Inference(format!(
                "zero-shot classifier returned status {}",
                response.status()
            )));
        }
        let parsed: ZeroShotResponse = response.json().await?;
        let result = ZeroShotResult::from(parsed);
        if result.labels.len() != result.scores.len() {
            return Err(Error::Inference(format!(
                "zero-shot classifier returned {} labels and {} scores",
                result.labels.len(),
                result.scores.len()
            )));
        }
        Ok(result)
    }
}

#[async_trait]
impl ZeroShotClassifier for HfZeroShotClassifier {
    fn name(&self) -> &str {
        "HF zero-shot"
    }

    async fn classify(&self, text: &str, labels: &[&str]) -> Result<ZeroShotResult> {
        if labels.is_empty() {
            return Err(Error::Precondition("no candidate labels".to_string()));
        }
        with_timeout(self.timeout, "classify", self.request(text, labels)).await
    }
}
