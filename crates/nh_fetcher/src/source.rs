use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nh_core::config::Settings;
use nh_core::{Article, Category, Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub category: Category,
    pub country: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Page {
        articles: Vec<Article>,
        next_page: Option<String>,
    },
    RateLimited {
        message: String,
    },
}

/// A paginated news API.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_page(&self, request: &PageRequest) -> Result<PageOutcome>;
}

#[derive(Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    results: Value,
    #[serde(rename = "nextPage", default)]
    next_page: Option<Value>,
}

#[derive(Deserialize)]
struct RawArticle {
    article_id: Option<String>,
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source_name: Option<String>,
    source_id: Option<String>,
    #[serde(default)]
    country: Value,
    image_url: Option<String>,
}

impl RawArticle {
    fn into_article(self) -> Option<Article> {
        let id = Article::dedup_key(self.article_id.as_deref(), self.link.as_deref(), self.title.as_deref())?;
        let country = match self.country {
            Value::String(s) => Some(s),
            Value::Array(values) => values.into_iter().find_map(|v| v.as_str().map(str::to_string)),
            _ => None,
        };
        Some(Article {
            id,
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            description: self.description,
            content: None,
            source: self.source_name.or(self.source_id),
            country,
            pub_date: self.pub_date,
            image_url: self.image_url,
        })
    }
}

fn is_rate_limit(message: &str, code: &str) -> bool {
    message.to_lowercase().contains("rate limit") || code == "RateLimitExceeded"
}

/// Client for the NewsData.io `latest` endpoint.
pub struct NewsDataClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for NewsDataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsDataClient")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl NewsDataClient {
    pub fn new(api_key: String, base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("NEWSDATA_API_KEY is required".to_string()));
        }
        let client = Client::builder().user_agent(user_agent).timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .newsdata_api_key
            .clone()
            .ok_or_else(|| Error::Config("NEWSDATA_API_KEY is required".to_string()))?;
        Self::new(
            api_key,
            &settings.newsdata_base_url,
            &settings.user_agent,
            settings.request_timeout,
        )
    }

    fn parse(&self, request: &PageRequest, body: ApiResponse) -> Result<PageOutcome> {
        match body.status.as_str() {
            "success" => {
                let raw = match body.results {
                    Value::Array(items) => items,
                    _ => Vec::new(),
                };
                let articles = raw
                    .into_iter()
                    .filter_map(|item| serde_json::from_value::<RawArticle>(item).ok())
                    .filter_map(RawArticle::into_article)
                    .collect();
                let next_page = match body.next_page {
                    Some(Value::String(s)) if !s.is_empty() => Some(s),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                };
                Ok(PageOutcome::Page { articles, next_page })
            }
            "error" => {
                let message = body.results.get("message").and_then(Value::as_str).unwrap_or_default();
                let code = body.results.get("code").and_then(Value::as_str).unwrap_or_default();
                if is_rate_limit(message, code) {
                    Ok(PageOutcome::RateLimited {
                        message: message.to_string(),
                    })
                } else {
                    Err(Error::Fetch(format!(
                        "API error for {} {}: {} {}",
                        request.category,
                        request.country.as_deref().unwrap_or("global"),
                        code,
                        message
                    )))
                }
            }
            other => Err(Error::Fetch(format!("Unexpected API status '{}'", other))),
        }
    }
}

#[async_trait]
impl NewsSource for NewsDataClient {
    fn name(&self) -> &str {
        "newsdata"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<PageOutcome> {
        let mut params: Vec<(&str, &str)> = vec![
            ("apikey", self.api_key.as_str()),
            ("category", request.category.as_str()),
            ("language", "en"),
        ];
        if let Some(country) = &request.country {
            params.push(("country", country.as_str()));
        }
        if let Some(page) = &request.page {
            params.push(("page", page.as_str()));
        }

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let status = response.status();
        if status.is_server_error() {
            response.error_for_status_ref()?;
        }

        let bytes = response.bytes().await?;
        match serde_json::from_slice::<ApiResponse>(&bytes) {
            Ok(body) => self.parse(request, body),
            Err(e) if status.is_success() => Err(e.into()),
            Err(_) => Err(Error::Fetch(format!("API returned status {}", status))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NewsDataClient {
        NewsDataClient::new("k".to_string(), "http://localhost", "ua", Duration::from_secs(1)).unwrap()
    }

    fn request() -> PageRequest {
        PageRequest {
            category: Category::Sports,
            country: Some("in".to_string()),
            page: None,
        }
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limit("Rate Limit exceeded, try later", ""));
        assert!(is_rate_limit("", "RateLimitExceeded"));
        assert!(!is_rate_limit("Invalid API key", "Unauthorized"));
    }

    #[test]
    fn test_parse_success_page() {
        let body: ApiResponse = serde_json::from_value(serde_json::json!({
            "status": "success",
            "results": [
                {"article_id": "a1", "title": "Mumbai cricket match", "link": "https://x/1",
                 "source_name": "Times of India", "country": ["india"], "pubDate": "2024-05-01 10:00:00"},
                {"title": "", "link": ""},
                {"title": "Only a title", "source_id": "bbc"}
            ],
            "nextPage": "cursor-2"
        }))
        .unwrap();

        match client().parse(&request(), body).unwrap() {
            PageOutcome::Page { articles, next_page } => {
                assert_eq!(next_page.as_deref(), Some("cursor-2"));
                assert_eq!(articles.len(), 2);
                assert_eq!(articles[0].id, "a1");
                assert_eq!(articles[0].country.as_deref(), Some("india"));
                assert_eq!(articles[0].source.as_deref(), Some("Times of India"));
                assert_eq!(articles[1].id, "Only a title");
                assert_eq!(articles[1].source.as_deref(), Some("bbc"));
                assert!(articles[1].content.is_none());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        let limited: ApiResponse = serde_json::from_value(serde_json::json!({
            "status": "error",
            "results": {"message": "API rate limit reached", "code": "RateLimitExceeded"}
        }))
        .unwrap();
        assert!(matches!(
            client().parse(&request(), limited).unwrap(),
            PageOutcome::RateLimited { .. }
        ));

        let denied: ApiResponse = serde_json::from_value(serde_json::json!({
            "status": "error",
            "results": {"message": "Invalid key", "code": "Unauthorized"}
        }))
        .unwrap();
        assert!(matches!(client().parse(&request(), denied), Err(Error::Fetch(_))));
    }
}
