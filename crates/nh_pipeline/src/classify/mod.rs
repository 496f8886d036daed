use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use nh_core::{with_timeout, Article, Category, LabeledArticle, Region, ZeroShotClassifier};

pub mod category;
pub mod region;

pub use category::keyword_category;
pub use region::detect_region;

/// Accept a zero-shot label only above this score.
pub const MIN_LABEL_SCORE: f32 = 0.4;

#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, article: &Article) -> (Region, Category);
}

/// Region from metadata and keywords; category from an optional zero-shot
/// model with keyword fallback.
pub struct ArticleClassifier {
    zero_shot: Option<Arc<dyn ZeroShotClassifier>>,
    timeout: Duration,
}

impl ArticleClassifier {
    pub fn new(zero_shot: Option<Arc<dyn ZeroShotClassifier>>, timeout: Duration) -> Self {
        Self { zero_shot, timeout }
    }

    pub fn keywords_only() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    pub async fn categorize(&self, article: &Article) -> Category {
        let Some(model) = &self.zero_shot else {
            return keyword_category(&category::keyword_text(article));
        };

        let text = category::zero_shot_text(article);
        if text.chars().count() < category::MIN_CLASSIFIABLE_CHARS {
            return Category::General;
        }

        let labels: Vec<&str> = Category::TOPICS.iter().map(Category::as_str).collect();
        match with_timeout(self.timeout, "classify", model.classify(&text, &labels)).await {
            Ok(result) => result
                .top()
                .filter(|(_, score)| *score > MIN_LABEL_SCORE)
                .and_then(|(label, _)| Category::from_label(label))
                .unwrap_or_else(|| keyword_category(&text)),
            Err(e) => {
                tracing::debug!("🏷️ {} failed for {}: {}", model.name(), article.id, e);
                keyword_category(&category::fallback_text(article))
            }
        }
    }
}

#[async_trait]
impl Classify for ArticleClassifier {
    async fn classify(&self, article: &Article) -> (Region, Category) {
        (detect_region(article), self.categorize(article).await)
    }
}

/// Labels every article, keeping input order, with up to `concurrency` calls in flight.
pub async fn label_articles(classifier: &dyn Classify, articles: Vec<Article>, concurrency: usize) -> Vec<LabeledArticle> {
    let total = articles.len();
    let labeled: Vec<LabeledArticle> = stream::iter(articles)
        .map(|article| async move {
            let (region, category) = classifier.classify(&article).await;
            LabeledArticle::new(article, region, category)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let india = labeled.iter().filter(|a| a.region() == Region::India).count();
    let topical = labeled.iter().filter(|a| a.category().is_topic()).count();
    tracing::info!(
        total,
        india,
        global = total - india,
        topical,
        "🏷️ Labeled articles"
    );
    labeled
}
