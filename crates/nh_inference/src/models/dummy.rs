use async_trait::async_trait;
use nh_core::{Embedder, Error, LanguageModel, Result};

use crate::embeddings::l2_normalize;

pub const DUMMY_DIMENSION: usize = 768;

/// Offline language model: answers with the first words of the last prompt line.
#[derive(Debug, Default, Clone)]
pub struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let line = prompt
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .ok_or_else(|| Error::Precondition("prompt is empty".to_string()))?;
        let words: Vec<&str> = line.split_whitespace().take(20).collect();
        Ok(words.join(" "))
    }
}

/// Offline embedder: character frequencies hashed into a fixed number of buckets.
/// Slot 0 carries the text length.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(2),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimension];
        let lowered = text.to_lowercase();
        let len = lowered.chars().count().max(1) as f32;
        embedding[0] = len / 1000.0;
        for c in lowered.chars().filter(|c| !c.is_whitespace()) {
            let slot = 1 + (c as usize) % (self.dimension - 1);
            embedding[slot] += 1.0 / len;
        }
        embedding
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DUMMY_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn embed(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = self.embed_one(t);
                if normalize {
                    l2_normalize(&mut v);
                }
                v
            })
            .collect())
    }
}
