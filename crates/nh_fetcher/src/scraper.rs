use std::time::Duration;

use async_trait::async_trait;
use nh_core::{with_timeout, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;

pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(20);

/// Pulls the readable body text of an article page.
#[async_trait]
pub trait ContentScraper: Send + Sync {
    /// `Ok(None)` when the page has no usable text.
    async fn scrape(&self, url: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct HtmlScraper {
    client: Client,
    timeout: Duration,
}

impl HtmlScraper {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().user_agent(user_agent).timeout(timeout).build()?,
            timeout,
        })
    }

    async fn download(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::debug!("📄 {} returned status {}", url, response.status());
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }
}

#[async_trait]
impl ContentScraper for HtmlScraper {
    async fn scrape(&self, url: &str) -> Result<Option<String>> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(None);
        }
        let html = with_timeout(self.timeout, "scrape", self.download(url)).await?;
        Ok(html.as_deref().and_then(extract_article_text))
    }
}

/// JSON-LD `articleBody` when the page carries one, else the page's paragraphs.
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    extract_jsonld_body(&document).or_else(|| extract_paragraphs(&document))
}

fn extract_jsonld_body(document: &Html) -> Option<String> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;
    document.select(&selector).find_map(|script| {
        let json = serde_json::from_str::<Value>(script.text().collect::<String>().trim()).ok()?;
        find_article_body(&json)
    })
}

fn find_article_body(json: &Value) -> Option<String> {
    match json {
        Value::Array(items) => items.iter().find_map(find_article_body),
        Value::Object(obj) => obj
            .get("articleBody")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|body| !body.is_empty())
            .map(str::to_string)
            .or_else(|| obj.get("@graph").and_then(find_article_body)),
        _ => None,
    }
}

fn extract_paragraphs(document: &Html) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    let paragraphs: Vec<String> = document
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();
    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n\n"))
    }
}
