use std::sync::Arc;

use nh_core::config::Settings;
use nh_core::{Error, LanguageModel, Result};

pub mod chat;
pub mod dummy;

pub use chat::ChatModel;
pub use dummy::{EchoModel, HashEmbedder};

/// Build the language model for `kind`:
/// - `auto`: the configured chat endpoint, or nothing without an API key
/// - `dummy`: the offline echo model
/// - `none`: no model
pub fn create_model(kind: &str, settings: &Settings) -> Result<Option<Arc<dyn LanguageModel>>> {
    match kind {
        "auto" => match &settings.llm_api_key {
            Some(key) => Ok(Some(Arc::new(ChatModel::new(
                key.clone(),
                &settings.llm_base_url,
                &settings.llm_model,
                settings.service_timeout,
            )?))),
            None => {
                tracing::info!("🧠 No language model API key set, running without a model");
                Ok(None)
            }
        },
        "dummy" => Ok(Some(Arc::new(EchoModel))),
        "none" => Ok(None),
        other => Err(Error::Config(format!(
            "Unknown model backend '{}'. Available backends: auto, dummy, none",
            other
        ))),
    }
}
