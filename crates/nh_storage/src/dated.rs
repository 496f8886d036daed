use std::future::Future;

use chrono::{Days, NaiveDate};
use nh_core::{Article, Error, ObjectStore, Result, TrendingSummary};

use crate::keys::{news_data_key, trending_key};
use crate::{get_json, put_json};

/// Tries `today`, then each earlier day, for `lookback_days` days in total and
/// returns the first day `load` succeeds for. Missing blobs are skipped quietly,
/// other failures are logged and skipped.
pub async fn find_latest<T, F, Fut>(today: NaiveDate, lookback_days: u32, mut load: F) -> Option<(NaiveDate, T)>
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for offset in 0..lookback_days {
        let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
            break;
        };
        match load(date).await {
            Ok(value) => return Some((date, value)),
            Err(Error::NotFound(_)) => continue,
            Err(e) => {
                tracing::warn!("⚠️ Skipping {}: {}", date, e);
                continue;
            }
        }
    }
    None
}

pub async fn news_data_exists(store: &dyn ObjectStore, prefix: &str, date: NaiveDate) -> Result<bool> {
    store.exists(&news_data_key(prefix, date)).await
}

pub async fn save_news_data(
    store: &dyn ObjectStore,
    prefix: &str,
    date: NaiveDate,
    articles: &[Article],
) -> Result<String> {
    let key = news_data_key(prefix, date);
    put_json(store, &key, articles).await?;
    Ok(key)
}

pub async fn load_latest_news_data(
    store: &dyn ObjectStore,
    prefix: &str,
    today: NaiveDate,
    lookback_days: u32,
) -> Option<(NaiveDate, Vec<Article>)> {
    find_latest(today, lookback_days, |date| {
        let key = news_data_key(prefix, date);
        async move { get_json::<Vec<Article>>(store, &key).await }
    })
    .await
}

pub async fn save_trending(store: &dyn ObjectStore, summary: &TrendingSummary) -> Result<String> {
    let key = trending_key(summary.data_date);
    put_json(store, &key, summary).await?;
    Ok(key)
}

pub async fn load_trending(store: &dyn ObjectStore, date: NaiveDate) -> Result<TrendingSummary> {
    get_json(store, &trending_key(date)).await
}

pub async fn load_latest_trending(
    store: &dyn ObjectStore,
    today: NaiveDate,
    lookback_days: u32,
) -> Option<(NaiveDate, TrendingSummary)> {
    find_latest(today, lookback_days, |date| load_trending(store, date)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use chrono::Utc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_find_latest_walks_backwards() {
        let mut seen = Vec::new();
        let found = find_latest(date(10), 3, |d| {
            seen.push(d);
            async move {
                if d == date(8) {
                    Ok("hit")
                } else {
                    Err(Error::NotFound(d.to_string()))
                }
            }
        })
        .await;
        assert_eq!(found, Some((date(8), "hit")));
        assert_eq!(seen, vec![date(10), date(9), date(8)]);
    }

    #[tokio::test]
    async fn test_find_latest_skips_broken_days() {
        let found = find_latest(date(10), 2, |d| async move {
            if d == date(10) {
                Err(Error::Storage("corrupt".to_string()))
            } else {
                Ok(d)
            }
        })
        .await;
        assert_eq!(found, Some((date(9), date(9))));

        let none: Option<(NaiveDate, ())> =
            find_latest(date(10), 0, |_| async { Ok(()) }).await;
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_trending_round_trip() {
        let store = MemoryStore::new();
        let summary = TrendingSummary::new(date(2), Utc::now());
        let key = save_trending(&store, &summary).await.unwrap();
        assert_eq!(key, "trending/2024-05-02/summary.json");

        let (found, loaded) = load_latest_trending(&store, date(4), 3).await.unwrap();
        assert_eq!(found, date(2));
        assert_eq!(loaded, summary);
        assert!(load_latest_trending(&store, date(5), 3).await.is_none());
    }

    #[tokio::test]
    async fn test_news_data_round_trip() {
        let store = MemoryStore::new();
        assert!(!news_data_exists(&store, "news_data", date(1)).await.unwrap());
        save_news_data(&store, "news_data", date(1), &[]).await.unwrap();
        assert!(news_data_exists(&store, "news_data", date(1)).await.unwrap());

        let (found, articles) = load_latest_news_data(&store, "news_data", date(1), 3).await.unwrap();
        assert_eq!(found, date(1));
        assert!(articles.is_empty());
    }
}
