use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use nh_core::Result;
use nh_storage::dated::find_latest;
use tokio::sync::RwLock;

/// The most recently loaded dated snapshot. Always replaced as a whole.
#[derive(Debug)]
pub struct SnapshotCache<T> {
    snapshot: Option<Arc<T>>,
    loaded_date: Option<NaiveDate>,
}

impl<T> Default for SnapshotCache<T> {
    fn default() -> Self {
        Self {
            snapshot: None,
            loaded_date: None,
        }
    }
}

impl<T> SnapshotCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.snapshot.clone()
    }

    pub fn loaded_date(&self) -> Option<NaiveDate> {
        self.loaded_date
    }

    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.loaded_date.is_some_and(|d| d >= today)
    }

    /// How many days back from `today` could hold something newer than the cached snapshot.
    pub fn days_to_scan(&self, today: NaiveDate, lookback_days: u32) -> u32 {
        match self.loaded_date {
            None => lookback_days,
            Some(d) if d >= today => 0,
            Some(d) => {
                let gap = (today - d).num_days();
                u32::try_from(gap).map_or(lookback_days, |gap| gap.min(lookback_days))
            }
        }
    }

    /// Stores `snapshot` unless the cache already holds a later date.
    pub fn replace(&mut self, date: NaiveDate, snapshot: T) -> Option<Arc<T>> {
        if self.loaded_date.map_or(true, |d| date >= d) {
            self.snapshot = Some(Arc::new(snapshot));
            self.loaded_date = Some(date);
        }
        self.get()
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
        self.loaded_date = None;
    }
}

/// Returns the cached snapshot, first loading a newer one when the cache is not
/// current. Loading goes back at most `lookback_days`, stopping at the cached date.
pub async fn refresh<T, F, Fut>(
    cache: &RwLock<SnapshotCache<T>>,
    today: NaiveDate,
    lookback_days: u32,
    load: F,
) -> Option<Arc<T>>
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let days = {
        let cache = cache.read().await;
        if cache.is_current(today) {
            return cache.get();
        }
        cache.days_to_scan(today, lookback_days)
    };

    if days > 0 {
        if let Some((date, snapshot)) = find_latest(today, days, load).await {
            tracing::info!("✅ Loaded snapshot from {}", date);
            return cache.write().await.replace(date, snapshot);
        }
    }
    cache.read().await.get()
}
