use std::sync::Arc;

use nh_core::config::Settings;
use nh_core::{Embedder, Error, Result, ZeroShotClassifier};

pub mod classifier;
pub mod embeddings;
pub mod lazy;
pub mod models;

pub use classifier::HfZeroShotClassifier;
pub use embeddings::{l2_normalize, TeiEmbedder};
pub use lazy::LazyModel;
pub use models::{create_model, ChatModel, EchoModel, HashEmbedder};

/// Embedder for `kind` (`auto`, `dummy` or `none`). `auto` needs `EMBEDDING_URL`.
pub fn create_embedder(kind: &str, settings: &Settings) -> Result<Option<Arc<dyn Embedder>>> {
    match kind {
        "auto" => match &settings.embedding_url {
            Some(url) => Ok(Some(Arc::new(TeiEmbedder::new(url, settings.service_timeout)?))),
            None => Ok(None),
        },
        "dummy" => Ok(Some(Arc::new(HashEmbedder::default()))),
        "none" => Ok(None),
        other => Err(Error::Config(format!(
            "Unknown embedder backend '{}'. Available backends: auto, dummy, none",
            other
        ))),
    }
}

/// Zero-shot classifier for `kind`. There is no offline classifier; `dummy`
/// leaves classification to the keyword rules.
pub fn create_classifier(kind: &str, settings: &Settings) -> Result<Option<Arc<dyn ZeroShotClassifier>>> {
    match kind {
        "auto" => match &settings.classifier_url {
            Some(url) => Ok(Some(Arc::new(HfZeroShotClassifier::new(
                url,
                settings.classifier_token.clone(),
                settings.service_timeout,
            )?))),
            None => Ok(None),
        },
        "dummy" | "none" => Ok(None),
        other => Err(Error::Config(format!(
            "Unknown classifier backend '{}'. Available backends: auto, dummy, none",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::{create_classifier, create_embedder, create_model, LazyModel};
    pub use nh_core::{Embedder, Error, LanguageModel, Result, ZeroShotClassifier};
}
