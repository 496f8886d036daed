use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nh_core::{with_timeout, Error, Result, SearchResult};
use nh_inference::LazyModel;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub summary: String,
    pub articles: Vec<SearchResult>,
}

#[async_trait]
pub trait Synthesize: Send + Sync {
    async fn synthesize(&self, query: &str, articles: &[SearchResult]) -> Result<Report>;
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default)
}

pub fn report_prompt(query: &str, articles: &[SearchResult]) -> String {
    let sources = articles
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let article = result.article.article();
            format!(
                "Source {} ({}): {}\n{}",
                i + 1,
                or_default(article.source.as_deref(), "Unknown"),
                or_default(Some(article.title.as_str()), "No Title"),
                or_default(article.description.as_deref(), "No description available.")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a senior news reporter. Your task is to answer the user's query based on a provided list of news articles.\n\n\
         User Query: {query}\n\n\
         Synthesize the information from the following articles to generate a concise, well-written summary that directly answers the user's question.\n\
         - Start with a headline-style summary.\n\
         - Then, provide a 2-4 paragraph summary of the key events, trends, or findings.\n\
         - Do not make up information. Base your report only on the content of the articles provided below.\n\
         - At the end of your report, list the articles you used as sources, for example: \"Sources: 1, 2.\"\n\n\
         Here are the articles:\n\
         ---\n\
         {sources}\n\
         ---\n\n\
         Your Final Report:\n"
    )
}

/// Deterministic summary used when no language model is configured.
pub fn basic_summary(query: &str, articles: &[SearchResult]) -> String {
    let mut summary = format!("Found {} articles related to '{}'.", articles.len(), query);
    if let Some(top) = articles.first() {
        let article = top.article.article();
        summary.push_str(&format!(
            " Top result: '{}' from {}.",
            or_default(Some(article.title.as_str()), "No Title"),
            or_default(article.source.as_deref(), "Unknown")
        ));
    }
    summary
}

pub struct ReportSynthesizer {
    model: Arc<LazyModel>,
    timeout: Duration,
}

impl ReportSynthesizer {
    pub fn new(model: Arc<LazyModel>) -> Self {
        Self {
            model,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Synthesize for ReportSynthesizer {
    async fn synthesize(&self, query: &str, articles: &[SearchResult]) -> Result<Report> {
        let query = query.trim();
        if query.is_empty() || articles.is_empty() {
            return Err(Error::Precondition("Missing query or articles for reporting".to_string()));
        }

        let summary = match self.model.get().await {
            Some(model) => {
                tracing::info!("📝 Writing report for '{}' from {} articles", query, articles.len());
                let text = with_timeout(self.timeout, "generate", model.generate(&report_prompt(query, articles))).await?;
                text.trim().to_string()
            }
            None => basic_summary(query, articles),
        };

        Ok(Report {
            summary,
            articles: articles.to_vec(),
        })
    }
}
