use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    India,
    Global,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::India, Region::Global];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::India => "India",
            Region::Global => "Global",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "india" => Ok(Region::India),
            "global" => Ok(Region::Global),
            other => Err(Error::Precondition(format!("Unknown region: {}", other))),
        }
    }
}

/// Topic categories. `General` is the catch-all and never reaches trending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    Politics,
    Technology,
    Health,
    Crime,
    Entertainment,
    General,
}

impl Category {
    /// The closed topic set, in the order used for fetching, tie-breaking and trending.
    pub const TOPICS: [Category; 6] = [
        Category::Sports,
        Category::Politics,
        Category::Technology,
        Category::Health,
        Category::Crime,
        Category::Entertainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sports => "sports",
            Category::Politics => "politics",
            Category::Technology => "technology",
            Category::Health => "health",
            Category::Crime => "crime",
            Category::Entertainment => "entertainment",
            Category::General => "general",
        }
    }

    pub fn is_topic(&self) -> bool {
        !matches!(self, Category::General)
    }

    /// Matches a topic label, ignoring case. `general` is not a topic label.
    pub fn from_label(label: &str) -> Option<Category> {
        let label = label.trim().to_lowercase();
        Self::TOPICS.into_iter().find(|c| c.as_str() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("general") {
            return Ok(Category::General);
        }
        Category::from_label(s).ok_or_else(|| Error::Precondition(format!("Unknown category: {}", s)))
    }
}

/// A raw article as fetched from the news source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Article {
    /// Dedup key: source article id, else link, else title. Blank values are skipped.
    pub fn dedup_key(article_id: Option<&str>, link: Option<&str>, title: Option<&str>) -> Option<String> {
        [article_id, link, title]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn has_source(&self) -> bool {
        self.source.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// An article with its region and category. Both labels are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledArticle {
    #[serde(flatten)]
    article: Article,
    region: Region,
    category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trending_score: Option<f64>,
}

impl LabeledArticle {
    pub fn new(article: Article, region: Region, category: Category) -> Self {
        Self {
            article,
            region,
            category,
            trending_score: None,
        }
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn trending_score(&self) -> Option<f64> {
        self.trending_score
    }

    pub fn with_trending_score(mut self, score: f64) -> Self {
        self.trending_score = Some(score);
        self
    }

    /// Drops the trending score, e.g. when a value fails sanitization.
    pub fn without_trending_score(mut self) -> Self {
        self.trending_score = None;
        self
    }

    /// Mutable access to the article fields; the labels stay untouched.
    pub fn article_mut(&mut self) -> &mut Article {
        &mut self.article
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingBucket {
    pub count: usize,
    pub top_stories: Vec<LabeledArticle>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

pub type RegionBuckets = BTreeMap<Category, TrendingBucket>;

/// Dated snapshot of top stories per (region, category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingSummary {
    #[serde(rename = "India", default)]
    pub india: RegionBuckets,
    #[serde(rename = "Global", default)]
    pub global: RegionBuckets,
    pub generation_time: DateTime<Utc>,
    pub data_date: NaiveDate,
}

impl TrendingSummary {
    pub fn new(data_date: NaiveDate, generation_time: DateTime<Utc>) -> Self {
        Self {
            india: BTreeMap::new(),
            global: BTreeMap::new(),
            generation_time,
            data_date,
        }
    }

    pub fn region(&self, region: Region) -> &RegionBuckets {
        match region {
            Region::India => &self.india,
            Region::Global => &self.global,
        }
    }

    pub fn region_mut(&mut self, region: Region) -> &mut RegionBuckets {
        match region {
            Region::India => &mut self.india,
            Region::Global => &mut self.global,
        }
    }

    pub fn bucket(&self, region: Region, category: Category) -> Option<&TrendingBucket> {
        self.region(region).get(&category)
    }

    pub fn insert(&mut self, region: Region, category: Category, bucket: TrendingBucket) {
        self.region_mut(region).insert(category, bucket);
    }

    pub fn is_empty(&self) -> bool {
        self.india.is_empty() && self.global.is_empty()
    }

    pub fn buckets(&self) -> impl Iterator<Item = (Region, Category, &TrendingBucket)> {
        Region::ALL
            .into_iter()
            .flat_map(move |r| self.region(r).iter().map(move |(c, b)| (r, *c, b)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(flatten)]
    pub article: LabeledArticle,
    pub relevance_score: Option<f64>,
}

pub type TrendingData = BTreeMap<Region, RegionBuckets>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub success: bool,
    pub message: String,
    pub data: TrendingData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time: Option<DateTime<Utc>>,
}

impl TrendingResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: BTreeMap::new(),
            generation_time: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<SearchResult>>,
    pub message: String,
}

impl QueryResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            articles: None,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: "Title".to_string(),
            link: format!("https://example.com/{}", id),
            description: Some("Description".to_string()),
            content: None,
            source: Some("Reuters".to_string()),
            country: None,
            pub_date: None,
            image_url: None,
        }
    }

    #[test]
    fn test_dedup_key_priority() {
        assert_eq!(
            Article::dedup_key(Some("abc"), Some("https://x"), Some("t")).as_deref(),
            Some("abc")
        );
        assert_eq!(
            Article::dedup_key(None, Some("https://x"), Some("t")).as_deref(),
            Some("https://x")
        );
        assert_eq!(Article::dedup_key(Some("  "), None, Some("t")).as_deref(), Some("t"));
        assert_eq!(Article::dedup_key(None, None, None), None);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Sports".parse::<Category>().unwrap(), Category::Sports);
        assert_eq!("general".parse::<Category>().unwrap(), Category::General);
        assert_eq!(Category::from_label("general"), None);
        assert!("weather".parse::<Category>().is_err());
        assert_eq!("INDIA".parse::<Region>().unwrap(), Region::India);
    }

    #[test]
    fn test_labeled_article_serializes_flat() {
        let labeled = LabeledArticle::new(article("a1"), Region::India, Category::Sports)
            .with_trending_score(0.5);
        let value = serde_json::to_value(&labeled).unwrap();
        assert_eq!(value["id"], "a1");
        assert_eq!(value["region"], "India");
        assert_eq!(value["category"], "sports");
        assert_eq!(value["trendingScore"], 0.5);

        let back: LabeledArticle = serde_json::from_value(value).unwrap();
        assert_eq!(back, labeled);
    }

    #[test]
    fn test_trending_summary_json_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut summary = TrendingSummary::new(date, Utc::now());
        summary.insert(
            Region::Global,
            Category::Health,
            TrendingBucket {
                count: 1,
                top_stories: vec![LabeledArticle::new(article("h1"), Region::Global, Category::Health)],
                summary: "Found 1 health stories from Global".to_string(),
                ai_summary: None,
            },
        );

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["Global"]["health"]["count"], 1);
        assert!(value["India"].as_object().unwrap().is_empty());
        assert_eq!(value["dataDate"], "2024-05-01");

        let back: TrendingSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back.bucket(Region::Global, Category::Health).unwrap().count, 1);
        assert_eq!(back.buckets().count(), 1);
    }
}
