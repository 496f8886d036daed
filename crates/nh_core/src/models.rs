use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`. Implementations reject empty prompts.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    /// Embed a batch of texts, one vector per text in input order.
    /// With `normalize` set, every vector has unit length so inner product equals cosine.
    async fn embed(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>>;
}

/// Labels ordered by confidence, descending, with matching scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZeroShotResult {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

impl ZeroShotResult {
    pub fn top(&self) -> Option<(&str, f32)> {
        Some((self.labels.first()?.as_str(), *self.scores.first()?))
    }
}

#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, text: &str, labels: &[&str]) -> Result<ZeroShotResult>;
}
