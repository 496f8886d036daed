pub mod classify;
pub mod indexer;
pub mod job;
pub mod trending;

pub use classify::{detect_region, keyword_category, label_articles, ArticleClassifier, Classify};
pub use indexer::{index_text, VectorIndexer};
pub use job::{ProcessingJob, ProcessingReport};
pub use trending::{augment_with_summaries, build_trending, trending_score, TOP_N};

pub mod prelude {
    pub use super::{ArticleClassifier, Classify, ProcessingJob, VectorIndexer};
    pub use nh_core::{Article, Category, LabeledArticle, Region, Result, TrendingSummary};
}
