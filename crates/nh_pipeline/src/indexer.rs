use std::sync::Arc;

use chrono::NaiveDate;
use nh_core::{Embedder, Error, LabeledArticle, ObjectStore, Result};
use nh_storage::{publish_snapshot, IndexManifest, VectorIndexSnapshot};

/// Texts of this many characters or fewer are not worth indexing.
pub const MIN_INDEX_CHARS: usize = 20;
pub const MAX_INDEX_CHARS: usize = 1000;

const MISSING_TITLE: &str = "No Title";

fn display_title(record: &LabeledArticle) -> &str {
    let title = record.article().title.trim();
    if title.is_empty() {
        MISSING_TITLE
    } else {
        title
    }
}

/// `"{title} {description}"` trimmed and cut to [`MAX_INDEX_CHARS`], or `None`
/// when too short to index.
pub fn index_text(record: &LabeledArticle) -> Option<String> {
    let text = format!("{} {}", display_title(record), record.article().description_text());
    let text = text.trim();
    if text.chars().count() <= MIN_INDEX_CHARS {
        return None;
    }
    Some(text.chars().take(MAX_INDEX_CHARS).collect())
}

pub struct VectorIndexer {
    embedder: Arc<dyn Embedder>,
}

impl VectorIndexer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Embeds every indexable record in one batch. Vectors and records keep the same order.
    pub async fn build(&self, date: NaiveDate, records: &[LabeledArticle]) -> Result<VectorIndexSnapshot> {
        let (texts, metadata): (Vec<String>, Vec<LabeledArticle>) = records
            .iter()
            .filter_map(|record| {
                let text = index_text(record)?;
                let mut record = record.clone().without_trending_score();
                if record.article().title.trim().is_empty() {
                    record.article_mut().title = MISSING_TITLE.to_string();
                }
                Some((text, record))
            })
            .unzip();

        if texts.is_empty() {
            return Err(Error::Precondition(format!(
                "none of {} articles has enough text to index",
                records.len()
            )));
        }

        tracing::info!(
            "🧮 Embedding {} of {} articles with {}",
            texts.len(),
            records.len(),
            self.embedder.name()
        );
        let vectors = self.embedder.embed(&texts, true).await?;
        if vectors.len() != texts.len() {
            return Err(Error::Inference(format!(
                "{} returned {} vectors for {} texts",
                self.embedder.name(),
                vectors.len(),
                texts.len()
            )));
        }

        VectorIndexSnapshot::new(date, vectors, metadata)
    }

    pub async fn build_and_publish(
        &self,
        store: &dyn ObjectStore,
        date: NaiveDate,
        records: &[LabeledArticle],
    ) -> Result<IndexManifest> {
        let snapshot = self.build(date, records).await?;
        publish_snapshot(store, &snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nh_core::{Article, Category, Region};
    use nh_inference::HashEmbedder;
    use nh_storage::{load_snapshot, MemoryStore};

    fn record(title: &str, description: Option<&str>) -> LabeledArticle {
        LabeledArticle::new(
            Article {
                id: format!("{}-{:?}", title, description),
                title: title.to_string(),
                link: String::new(),
                description: description.map(str::to_string),
                content: None,
                source: None,
                country: None,
                pub_date: None,
                image_url: None,
            },
            Region::Global,
            Category::General,
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_index_text_rules() {
        assert_eq!(index_text(&record("Short", None)), None);
        assert_eq!(
            index_text(&record("Parliament passes budget", Some("After long debate"))).as_deref(),
            Some("Parliament passes budget After long debate")
        );
        assert_eq!(
            index_text(&record("  ", Some("Description long enough to index"))).as_deref(),
            Some("No Title Description long enough to index")
        );
        let long = index_text(&record("Long", Some(&"y".repeat(5000)))).unwrap();
        assert_eq!(long.chars().count(), MAX_INDEX_CHARS);
    }

    #[tokio::test]
    async fn test_build_keeps_positions_parallel() {
        let indexer = VectorIndexer::new(Arc::new(HashEmbedder::new(32)));
        let records = vec![
            record("Markets rally on rate cut hopes", None),
            record("Tiny", None),
            record("", Some("Storm warning issued for the coast")),
        ];

        let snapshot = indexer.build(date(), &records).await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.index().len(), 2);
        assert_eq!(snapshot.dimension(), 32);
        assert_eq!(snapshot.record(0).unwrap().article().title, "Markets rally on rate cut hopes");
        assert_eq!(snapshot.record(1).unwrap().article().title, "No Title");

        let norm: f32 = snapshot.index().vectors()[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_nothing_indexable_publishes_nothing() {
        let store = MemoryStore::new();
        let indexer = VectorIndexer::new(Arc::new(HashEmbedder::new(8)));
        let err = indexer
            .build_and_publish(&store, date(), &[record("Tiny", None)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(matches!(load_snapshot(&store, date()).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_publish_then_load() {
        let store = MemoryStore::new();
        let indexer = VectorIndexer::new(Arc::new(HashEmbedder::new(16)));
        let records = vec![record("Election commission announces dates", Some("Polls in May"))];

        let manifest = indexer.build_and_publish(&store, date(), &records).await.unwrap();
        assert_eq!(manifest.count, 1);

        let loaded = load_snapshot(&store, date()).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.dimension(), 16);
    }
}
