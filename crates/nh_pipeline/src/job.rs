use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use nh_core::{Embedder, Error, LabeledArticle, LanguageModel, ObjectStore, Result};
use nh_storage::dated::{load_latest_news_data, save_trending};
use nh_storage::IndexManifest;

use crate::classify::{label_articles, Classify};
use crate::indexer::VectorIndexer;
use crate::trending::{augment_with_summaries, build_trending};

/// Days of news data considered, today included.
pub const NEWS_LOOKBACK_DAYS: u32 = 3;

const CLASSIFY_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingReport {
    pub data_date: NaiveDate,
    pub articles: usize,
    pub topical: usize,
    pub trending_key: String,
    pub index: Option<IndexManifest>,
}

/// Labels the latest news data, then builds the trending summary and the
/// vector index side by side.
pub struct ProcessingJob {
    store: Arc<dyn ObjectStore>,
    classifier: Arc<dyn Classify>,
    embedder: Option<Arc<dyn Embedder>>,
    model: Option<Arc<dyn LanguageModel>>,
    prefix: String,
    timeout: Duration,
}

impl ProcessingJob {
    pub fn new(store: Arc<dyn ObjectStore>, classifier: Arc<dyn Classify>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            classifier,
            embedder: None,
            model: None,
            prefix: prefix.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_embedder(mut self, embedder: Option<Arc<dyn Embedder>>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn with_model(mut self, model: Option<Arc<dyn LanguageModel>>) -> Self {
        self.model = model;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run(&self, today: NaiveDate) -> Result<ProcessingReport> {
        let start = Instant::now();
        let Some((data_date, articles)) =
            load_latest_news_data(self.store.as_ref(), &self.prefix, today, NEWS_LOOKBACK_DAYS).await
        else {
            return Err(Error::NotFound(format!(
                "no news data within {} days of {}",
                NEWS_LOOKBACK_DAYS, today
            )));
        };
        tracing::info!("📰 Loaded {} articles from {}", articles.len(), data_date);

        let labeled = label_articles(self.classifier.as_ref(), articles, CLASSIFY_CONCURRENCY).await;
        let topical = labeled.iter().filter(|a| a.category().is_topic()).count();

        let (trending, index) = tokio::join!(
            self.publish_trending(data_date, &labeled),
            self.publish_index(data_date, &labeled)
        );
        let trending_key = trending?;

        tracing::info!(
            elapsed = ?start.elapsed(),
            "🎉 Processing for {} complete: {} articles, {} topical",
            data_date,
            labeled.len(),
            topical
        );

        Ok(ProcessingReport {
            data_date,
            articles: labeled.len(),
            topical,
            trending_key,
            index,
        })
    }

    async fn publish_trending(&self, data_date: NaiveDate, labeled: &[LabeledArticle]) -> Result<String> {
        let mut summary = {
            let mut rng = rand::thread_rng();
            build_trending(labeled, data_date, Utc::now(), &mut rng)
        };
        if let Some(model) = &self.model {
            augment_with_summaries(&mut summary, model.as_ref(), self.timeout).await;
        }

        let key = save_trending(self.store.as_ref(), &summary).await?;
        let stories: usize = summary.buckets().map(|(_, _, b)| b.top_stories.len()).sum();
        tracing::info!("📈 Saved trending summary to {} ({} top stories)", key, stories);
        Ok(key)
    }

    async fn publish_index(&self, data_date: NaiveDate, labeled: &[LabeledArticle]) -> Option<IndexManifest> {
        let Some(embedder) = &self.embedder else {
            tracing::warn!("⚠️ No embedder configured, skipping vector index");
            return None;
        };
        match VectorIndexer::new(Arc::clone(embedder))
            .build_and_publish(self.store.as_ref(), data_date, labeled)
            .await
        {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::error!("❌ Vector index for {} failed: {}", data_date, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ArticleClassifier;
    use nh_core::{Article, Category, Region};
    use nh_inference::{EchoModel, HashEmbedder};
    use nh_storage::dated::{load_trending, save_news_data};
    use nh_storage::{load_snapshot, MemoryStore};

    fn article(id: &str, title: &str, source: &str) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            link: format!("https://news.example/{}", id),
            description: Some(format!("{} with further coverage", title)),
            content: None,
            source: Some(source.to_string()),
            country: None,
            pub_date: None,
            image_url: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn job(store: Arc<dyn ObjectStore>) -> ProcessingJob {
        ProcessingJob::new(store, Arc::new(ArticleClassifier::keywords_only()), "news_data")
    }

    #[tokio::test]
    async fn test_missing_data_is_not_found() {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryStore::new());
        let err = job(store).run(day(10)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_processes_latest_day_within_lookback() {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryStore::new());
        let articles = vec![
            article("1", "Mumbai cricket match thrills fans", "Times of India"),
            article("2", "Police arrest suspect in bank theft", "Reuters"),
            article("3", "Quarterly results land today", "Reuters"),
        ];
        save_news_data(store.as_ref(), "news_data", day(8), &articles).await.unwrap();

        let report = job(Arc::clone(&store))
            .with_embedder(Some(Arc::new(HashEmbedder::new(16))))
            .with_model(Some(Arc::new(EchoModel)))
            .run(day(10))
            .await
            .unwrap();

        assert_eq!(report.data_date, day(8));
        assert_eq!(report.articles, 3);
        assert_eq!(report.topical, 2);
        assert_eq!(report.trending_key, "trending/2024-05-08/summary.json");
        assert_eq!(report.index.as_ref().map(|m| m.count), Some(3));

        let summary = load_trending(store.as_ref(), day(8)).await.unwrap();
        let sports = summary.bucket(Region::India, Category::Sports).unwrap();
        assert_eq!(sports.count, 1);
        assert!(sports.ai_summary.is_some());
        assert!(summary.bucket(Region::Global, Category::Crime).is_some());

        let snapshot = load_snapshot(store.as_ref(), day(8)).await.unwrap();
        assert_eq!(snapshot.len(), 3);
    }

    #[tokio::test]
    async fn test_runs_without_embedder_or_model() {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryStore::new());
        save_news_data(
            store.as_ref(),
            "news_data",
            day(10),
            &[article("1", "Hospital opens new vaccine wing", "Reuters")],
        )
        .await
        .unwrap();

        let report = job(store).run(day(10)).await.unwrap();
        assert!(report.index.is_none());
        assert_eq!(report.topical, 1);
    }
}
