use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use nh_core::{with_timeout, Embedder, Error, LabeledArticle, ObjectStore, Result, SearchResult};
use nh_inference::LazyModel;
use nh_storage::{load_snapshot, VectorIndexSnapshot};
use tokio::sync::RwLock;

use crate::cache::{refresh, SnapshotCache};

/// Days scanned backwards for a published index, today included.
pub const INDEX_LOOKBACK_DAYS: u32 = 10;

#[async_trait]
pub trait Search: Send + Sync {
    /// Up to `top_k` articles, most relevant first.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>>;

    /// Forgets any cached index; the next search reloads from storage.
    async fn invalidate(&self) {}
}

pub fn rewrite_prompt(query: &str) -> String {
    format!(
        "Enhance this search query for better news search: \"{}\"\n\
         Add relevant keywords and synonyms. Return only the enhanced query.",
        query
    )
}

fn clean(value: &mut Option<String>) {
    let blank = value.as_deref().is_some_and(|v| {
        let v = v.trim();
        v.is_empty() || v.eq_ignore_ascii_case("nan")
    });
    if blank {
        *value = None;
    }
}

/// Blank or `nan` strings become `None`, and so do non-finite numbers.
pub fn sanitize(mut record: LabeledArticle, similarity: f32) -> SearchResult {
    let article = record.article_mut();
    clean(&mut article.description);
    clean(&mut article.content);
    clean(&mut article.source);
    clean(&mut article.country);
    clean(&mut article.pub_date);
    clean(&mut article.image_url);

    if record.trending_score().is_some_and(|s| !s.is_finite()) {
        record = record.without_trending_score();
    }

    SearchResult {
        article: record,
        relevance_score: similarity.is_finite().then_some(f64::from(similarity)),
    }
}

/// Semantic search over the newest published vector index.
pub struct SearchEngine {
    store: Arc<dyn ObjectStore>,
    embedder: Option<Arc<dyn Embedder>>,
    model: Arc<LazyModel>,
    index: RwLock<SnapshotCache<VectorIndexSnapshot>>,
    timeout: Duration,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn ObjectStore>, embedder: Option<Arc<dyn Embedder>>, model: Arc<LazyModel>) -> Self {
        Self {
            store,
            embedder,
            model,
            index: RwLock::new(SnapshotCache::new()),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The rewritten query, or `query` itself when no model answers usefully.
    pub async fn rewrite_query(&self, query: &str) -> String {
        let Some(model) = self.model.get().await else {
            return query.to_string();
        };
        match with_timeout(self.timeout, "generate", model.generate(&rewrite_prompt(query))).await {
            Ok(text) if !text.trim().is_empty() => {
                let rewritten = text.trim().to_string();
                tracing::debug!("🔍 Rewrote '{}' as '{}'", query, rewritten);
                rewritten
            }
            Ok(_) => query.to_string(),
            Err(e) => {
                tracing::warn!("⚠️ Query rewrite failed, using the raw query: {}", e);
                query.to_string()
            }
        }
    }

    async fn current_index(&self, today: NaiveDate) -> Option<Arc<VectorIndexSnapshot>> {
        let store = self.store.as_ref();
        refresh(&self.index, today, INDEX_LOOKBACK_DAYS, |date| load_snapshot(store, date)).await
    }

    pub async fn search_at(&self, today: NaiveDate, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Precondition("No search query provided".to_string()));
        }
        let Some(embedder) = &self.embedder else {
            return Err(Error::Unavailable("embedding service"));
        };
        let Some(snapshot) = self.current_index(today).await else {
            return Err(Error::NotFound(format!(
                "no vector index within {} days of {}",
                INDEX_LOOKBACK_DAYS, today
            )));
        };
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let rewritten = self.rewrite_query(query).await;
        let vector = embedder
            .embed(&[rewritten], true)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference(format!("{} returned no vector", embedder.name())))?;

        let scan = Arc::clone(&snapshot);
        let hits = tokio::task::spawn_blocking(move || scan.index().search(&vector, top_k))
            .await
            .map_err(|e| Error::External(anyhow::anyhow!("similarity scan failed: {}", e)))??;

        let results: Vec<SearchResult> = hits
            .into_iter()
            .filter_map(|(position, similarity)| {
                let record = snapshot.record(position)?.clone();
                Some(sanitize(record, similarity))
            })
            .collect();

        tracing::info!(
            "🔍 Found {} results for '{}' in the {} index",
            results.len(),
            query,
            snapshot.date()
        );
        Ok(results)
    }
}

#[async_trait]
impl Search for SearchEngine {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        self.search_at(Utc::now().date_naive(), query, top_k).await
    }

    async fn invalidate(&self) {
        self.index.write().await.invalidate();
    }
}
