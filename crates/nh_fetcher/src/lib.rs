pub mod arena;
pub mod fetcher;
pub mod job;
pub mod rate_limit;
pub mod scraper;
pub mod source;

pub use crate::arena::ArticleArena;
pub use crate::fetcher::{FetchOptions, FetchState, Fetcher, RegionTarget};
pub use crate::job::{IngestJob, IngestOutcome};
pub use crate::scraper::{ContentScraper, HtmlScraper, SCRAPE_TIMEOUT};
pub use crate::source::{NewsDataClient, NewsSource, PageOutcome, PageRequest};

pub mod prelude {
    pub use super::{ContentScraper, FetchOptions, Fetcher, HtmlScraper, IngestJob, NewsDataClient, NewsSource};
    pub use nh_core::{Article, Category, Region, Result};
}
