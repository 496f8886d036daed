use std::sync::Arc;

use chrono::NaiveDate;
use nh_core::{Category, ObjectStore, Region, Result};
use nh_storage::dated::{news_data_exists, save_news_data};
use nh_storage::keys::news_data_key;

use crate::fetcher::Fetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    AlreadyDone { key: String },
    Empty,
    Saved { key: String, total: usize, with_content: usize },
}

/// Daily ingestion: fetch every topic for both regions and persist the batch.
pub struct IngestJob {
    store: Arc<dyn ObjectStore>,
    fetcher: Fetcher,
    prefix: String,
}

impl IngestJob {
    pub fn new(store: Arc<dyn ObjectStore>, fetcher: Fetcher, prefix: impl Into<String>) -> Self {
        Self {
            store,
            fetcher,
            prefix: prefix.into(),
        }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<IngestOutcome> {
        if news_data_exists(self.store.as_ref(), &self.prefix, today).await? {
            tracing::info!("✅ Already completed {}", today);
            return Ok(IngestOutcome::AlreadyDone {
                key: news_data_key(&self.prefix, today),
            });
        }

        tracing::info!("🚀 Starting ingestion for {}", today);
        let started = tokio::time::Instant::now();
        let articles = self.fetcher.fetch(&Category::TOPICS, &Region::ALL).await;
        if articles.is_empty() {
            tracing::error!("❌ No articles fetched");
            return Ok(IngestOutcome::Empty);
        }

        let key = save_news_data(self.store.as_ref(), &self.prefix, today, &articles).await?;
        let with_content = articles.iter().filter(|a| a.has_content()).count();
        tracing::info!(
            "🎉 DONE! {} articles ({} with content) in {:.1} minutes",
            articles.len(),
            with_content,
            started.elapsed().as_secs_f64() / 60.0
        );
        Ok(IngestOutcome::Saved {
            key,
            total: articles.len(),
            with_content,
        })
    }
}
