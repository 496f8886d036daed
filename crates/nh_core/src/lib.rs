pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod storage;
pub mod timeout;
pub mod types;

pub use error::Error;
pub use models::{Embedder, LanguageModel, ZeroShotClassifier, ZeroShotResult};
pub use retry::retry_with_backoff;
pub use storage::ObjectStore;
pub use timeout::with_timeout;
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::config::Settings;
    pub use super::models::{Embedder, LanguageModel, ZeroShotClassifier};
    pub use super::storage::ObjectStore;
    pub use super::types::{Article, Category, LabeledArticle, Region};
    pub use super::{Error, Result};
}
