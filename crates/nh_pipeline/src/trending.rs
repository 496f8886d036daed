use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use nh_core::{with_timeout, Article, Category, LabeledArticle, LanguageModel, Region, TrendingBucket, TrendingSummary};
use rand::Rng;

/// Stories kept per (region, category) bucket.
pub const TOP_N: usize = 5;

/// Stories handed to the language model for a bucket narrative.
const PROMPT_STORIES: usize = 3;

const DESCRIPTION_CAP: usize = 100;

/// `0.3·has_source + 0.4·min(description chars, 100)/100 + 0.3·U[0,1)`, always in `[0, 1]`.
pub fn trending_score<R: Rng + ?Sized>(article: &Article, rng: &mut R) -> f64 {
    let source = if article.has_source() { 1.0 } else { 0.0 };
    let description = article.description_text().chars().count().min(DESCRIPTION_CAP) as f64 / DESCRIPTION_CAP as f64;
    let freshness: f64 = rng.gen();
    0.3 * source + 0.4 * description + 0.3 * freshness
}

/// Buckets topical articles by (region, category) and keeps the top stories of each.
/// `general` articles and empty buckets never appear in the result.
pub fn build_trending<R: Rng + ?Sized>(
    articles: &[LabeledArticle],
    data_date: NaiveDate,
    generation_time: DateTime<Utc>,
    rng: &mut R,
) -> TrendingSummary {
    let mut buckets: BTreeMap<(Region, Category), Vec<LabeledArticle>> = BTreeMap::new();
    for labeled in articles.iter().filter(|a| a.category().is_topic()) {
        let score = trending_score(labeled.article(), rng);
        buckets
            .entry((labeled.region(), labeled.category()))
            .or_default()
            .push(labeled.clone().with_trending_score(score));
    }

    let mut summary = TrendingSummary::new(data_date, generation_time);
    for ((region, category), mut stories) in buckets {
        let count = stories.len();
        stories.sort_by(|a, b| {
            let a = a.trending_score().unwrap_or(0.0);
            let b = b.trending_score().unwrap_or(0.0);
            b.total_cmp(&a)
        });
        stories.truncate(TOP_N);

        tracing::debug!(%region, %category, count, "📈 Bucket ranked");
        summary.insert(
            region,
            category,
            TrendingBucket {
                count,
                top_stories: stories,
                summary: format!("Found {} {} stories from {}", count, category, region),
                ai_summary: None,
            },
        );
    }
    summary
}

pub fn ai_summary_prompt(region: Region, category: Category, bucket: &TrendingBucket) -> String {
    let stories = bucket
        .top_stories
        .iter()
        .take(PROMPT_STORIES)
        .map(|story| {
            let article = story.article();
            let source = article.source.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or("Unknown");
            format!("- {} ({})", article.title, source)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a brief trending news summary for {} news in {}.\n\n\
         Top stories:\n{}\n\n\
         Write a 2-3 sentence summary highlighting the key trends and developments. Be concise and informative.",
        category, region, stories
    )
}

/// Asks the model for a short narrative per bucket. A failed or timed out call
/// leaves that bucket's `ai_summary` empty.
pub async fn augment_with_summaries(summary: &mut TrendingSummary, model: &dyn LanguageModel, timeout: Duration) {
    let prompts: Vec<(Region, Category, String)> = summary
        .buckets()
        .filter(|(_, _, bucket)| !bucket.top_stories.is_empty())
        .map(|(region, category, bucket)| (region, category, ai_summary_prompt(region, category, bucket)))
        .collect();

    tracing::info!("🤖 Generating {} bucket summaries with {}", prompts.len(), model.name());

    let results = join_all(prompts.into_iter().map(|(region, category, prompt)| async move {
        let result = with_timeout(timeout, "generate", model.generate(&prompt)).await;
        (region, category, result)
    }))
    .await;

    for (region, category, result) in results {
        match result {
            Ok(text) if !text.trim().is_empty() => {
                if let Some(bucket) = summary.region_mut(region).get_mut(&category) {
                    bucket.ai_summary = Some(text.trim().to_string());
                }
            }
            Ok(_) => tracing::warn!("⚠️ Empty summary for {} / {}", region, category),
            Err(e) => tracing::warn!("⚠️ Summary for {} / {} failed: {}", region, category, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nh_core::{Error, Result};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn labeled(id: &str, region: Region, category: Category, description: &str, source: Option<&str>) -> LabeledArticle {
        LabeledArticle::new(
            Article {
                id: id.to_string(),
                title: format!("Story {}", id),
                link: String::new(),
                description: Some(description.to_string()),
                content: None,
                source: source.map(str::to_string),
                country: None,
                pub_date: None,
                image_url: None,
            },
            region,
            category,
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_score_stays_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let long = labeled("a", Region::India, Category::Sports, &"d".repeat(400), Some("NDTV"));
        let bare = labeled("b", Region::India, Category::Sports, "", None);
        for _ in 0..200 {
            let high = trending_score(long.article(), &mut rng);
            let low = trending_score(bare.article(), &mut rng);
            assert!((0.0..=1.0).contains(&high));
            assert!((0.0..0.3).contains(&low));
            assert!(high >= 0.7);
        }
    }

    #[test]
    fn test_buckets_keep_top_five_sorted() {
        let mut articles: Vec<LabeledArticle> = (0..8)
            .map(|i| labeled(&i.to_string(), Region::Global, Category::Health, &"x".repeat(i * 10), Some("Reuters")))
            .collect();
        articles.push(labeled("g", Region::Global, Category::General, "ignored", None));
        articles.push(labeled("s", Region::India, Category::Sports, "one", None));

        let mut rng = StdRng::seed_from_u64(42);
        let summary = build_trending(&articles, date(), Utc::now(), &mut rng);

        let health = summary.bucket(Region::Global, Category::Health).unwrap();
        assert_eq!(health.count, 8);
        assert_eq!(health.top_stories.len(), TOP_N);
        assert_eq!(health.summary, "Found 8 health stories from Global");
        let scores: Vec<f64> = health.top_stories.iter().map(|s| s.trending_score().unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        assert_eq!(summary.bucket(Region::India, Category::Sports).unwrap().count, 1);
        assert!(summary.bucket(Region::Global, Category::General).is_none());
        assert!(summary.bucket(Region::India, Category::Crime).is_none());
        assert_eq!(summary.buckets().count(), 2);
        assert_eq!(summary.data_date, date());
    }

    #[test]
    fn test_prompt_lists_three_stories() {
        let articles: Vec<LabeledArticle> = (0..5)
            .map(|i| labeled(&i.to_string(), Region::India, Category::Crime, "desc", if i == 0 { None } else { Some("NDTV") }))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let summary = build_trending(&articles, date(), Utc::now(), &mut rng);
        let bucket = summary.bucket(Region::India, Category::Crime).unwrap();

        let prompt = ai_summary_prompt(Region::India, Category::Crime, bucket);
        assert!(prompt.starts_with("Create a brief trending news summary for crime news in India."));
        assert_eq!(prompt.lines().filter(|l| l.starts_with("- Story")).count(), 3);
    }

    struct ScriptedModel;

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("health") {
                Err(Error::Inference("quota".to_string()))
            } else {
                Ok("  Busy day in sports.  ".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_failed_summaries_stay_absent() {
        let articles = vec![
            labeled("1", Region::Global, Category::Health, "desc", None),
            labeled("2", Region::Global, Category::Sports, "desc", None),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let mut summary = build_trending(&articles, date(), Utc::now(), &mut rng);

        augment_with_summaries(&mut summary, &ScriptedModel, Duration::from_secs(5)).await;

        let sports = summary.bucket(Region::Global, Category::Sports).unwrap();
        assert_eq!(sports.ai_summary.as_deref(), Some("Busy day in sports."));
        assert!(summary.bucket(Region::Global, Category::Health).unwrap().ai_summary.is_none());
    }
}
