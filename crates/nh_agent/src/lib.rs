pub mod cache;
pub mod orchestrator;
pub mod report;
pub mod search;

pub use cache::SnapshotCache;
pub use orchestrator::Orchestrator;
pub use report::{basic_summary, Report, ReportSynthesizer, Synthesize};
pub use search::{sanitize, Search, SearchEngine};

pub mod prelude {
    pub use super::{Orchestrator, ReportSynthesizer, Search, SearchEngine, Synthesize};
    pub use nh_core::{QueryResponse, Result, SearchResult, TrendingResponse};
}
