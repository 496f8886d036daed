use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use futures::FutureExt;
use nh_core::{
    Category, Embedder, ObjectStore, QueryResponse, Region, RegionBuckets, TrendingResponse, TrendingSummary,
};
use nh_inference::LazyModel;
use nh_storage::dated::load_trending;
use tokio::sync::RwLock;

use crate::cache::{refresh, SnapshotCache};
use crate::report::{ReportSynthesizer, Synthesize};
use crate::search::{Search, SearchEngine};

/// Days scanned backwards for a trending summary, today included.
pub const TRENDING_LOOKBACK_DAYS: u32 = 3;

const NO_TRENDING: &str = "No trending news available. Please run the background job.";
const NO_RESULTS: &str = "I found no relevant articles for your query.";
const UNEXPECTED: &str = "An unexpected error occurred while processing your query. Please try again later.";

/// Entry point for trending lookups and question answering.
pub struct Orchestrator {
    store: Arc<dyn ObjectStore>,
    search: Arc<dyn Search>,
    synthesizer: Arc<dyn Synthesize>,
    model: Arc<LazyModel>,
    trending: RwLock<SnapshotCache<TrendingSummary>>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        search: Arc<dyn Search>,
        synthesizer: Arc<dyn Synthesize>,
        model: Arc<LazyModel>,
    ) -> Self {
        Self {
            store,
            search,
            synthesizer,
            model,
            trending: RwLock::new(SnapshotCache::new()),
        }
    }

    /// Wires the default search engine and report synthesizer around one shared model handle.
    pub fn assemble(
        store: Arc<dyn ObjectStore>,
        embedder: Option<Arc<dyn Embedder>>,
        model: Arc<LazyModel>,
        timeout: Duration,
    ) -> Self {
        let search = SearchEngine::new(Arc::clone(&store), embedder, Arc::clone(&model)).with_timeout(timeout);
        let synthesizer = ReportSynthesizer::new(Arc::clone(&model)).with_timeout(timeout);
        Self::new(store, Arc::new(search), Arc::new(synthesizer), model)
    }

    pub fn model(&self) -> &Arc<LazyModel> {
        &self.model
    }

    /// Drops the cached trending summary and vector index; the next lookup reloads from storage.
    pub async fn invalidate(&self) {
        self.trending.write().await.invalidate();
        self.search.invalidate().await;
        tracing::info!("🧹 Trending and index caches cleared");
    }

    async fn trending_summary(&self, today: NaiveDate) -> Option<Arc<TrendingSummary>> {
        let store = self.store.as_ref();
        refresh(&self.trending, today, TRENDING_LOOKBACK_DAYS, |date| load_trending(store, date)).await
    }

    pub async fn get_trending(&self, region: Option<Region>, category: Option<Category>) -> TrendingResponse {
        self.get_trending_at(Utc::now().date_naive(), region, category).await
    }

    pub async fn get_trending_at(
        &self,
        today: NaiveDate,
        region: Option<Region>,
        category: Option<Category>,
    ) -> TrendingResponse {
        let Some(summary) = self.trending_summary(today).await else {
            tracing::warn!("⚠️ No trending summary within {} days", TRENDING_LOOKBACK_DAYS);
            return TrendingResponse::failure(NO_TRENDING);
        };

        let (message, data) = match (region, category) {
            (Some(region), Some(category)) if summary.bucket(region, category).is_some() => {
                let buckets: RegionBuckets = summary
                    .region(region)
                    .iter()
                    .filter(|(c, _)| **c == category)
                    .map(|(c, b)| (*c, b.clone()))
                    .collect();
                (
                    format!("Trending {} news in {}", category, region),
                    BTreeMap::from([(region, buckets)]),
                )
            }
            (Some(region), _) => (
                format!("All trending news in {}", region),
                BTreeMap::from([(region, summary.region(region).clone())]),
            ),
            (None, _) => (
                "All trending news".to_string(),
                Region::ALL
                    .into_iter()
                    .map(|r| (r, summary.region(r).clone()))
                    .collect(),
            ),
        };

        TrendingResponse {
            success: true,
            message,
            data,
            generation_time: Some(summary.generation_time),
        }
    }

    /// Search, then summarize. Every failure, panics included, comes back as a failure response.
    pub async fn answer_query(&self, query: &str, max_results: usize) -> QueryResponse {
        match AssertUnwindSafe(self.compose(query, max_results)).catch_unwind().await {
            Ok(response) => response,
            Err(_) => {
                tracing::error!("❌ Query '{}' panicked", query);
                QueryResponse::failure(UNEXPECTED)
            }
        }
    }

    async fn compose(&self, query: &str, max_results: usize) -> QueryResponse {
        let query = query.trim();
        if query.is_empty() {
            return QueryResponse::failure("Search failed: No search query provided");
        }

        // Warm the shared model handle before the components reach for it.
        self.model.get().await;

        let articles = match self.search.search(query, max_results).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!("⚠️ Search for '{}' failed: {}", query, e);
                return QueryResponse::failure(format!("Search failed: {}", e));
            }
        };

        if articles.is_empty() {
            return QueryResponse {
                success: true,
                summary: None,
                articles: Some(Vec::new()),
                message: NO_RESULTS.to_string(),
            };
        }

        match self.synthesizer.synthesize(query, &articles).await {
            Ok(report) => QueryResponse {
                success: true,
                summary: Some(report.summary),
                articles: Some(report.articles),
                message: "Report generated successfully.".to_string(),
            },
            Err(e) => {
                tracing::warn!("⚠️ Report for '{}' failed: {}", query, e);
                QueryResponse::failure(format!("Reporting failed: {}", e))
            }
        }
    }
}
