//! Integration tests for the NewsData client and the HTML scraper using wiremock.

use std::time::Duration;

use nh_core::{Category, Error};
use nh_fetcher::{ContentScraper, HtmlScraper, NewsDataClient, NewsSource, PageOutcome, PageRequest};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> NewsDataClient {
    NewsDataClient::new(
        "test-key".to_string(),
        &format!("{}/api/1/latest", base_url),
        "news-hub-test",
        Duration::from_secs(5),
    )
    .expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_page_sends_query_and_parses_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1/latest"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("category", "sports"))
        .and(query_param("language", "en"))
        .and(query_param("country", "in"))
        .and(query_param("page", "cursor-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "totalResults": 1,
            "results": [{
                "article_id": "abc123",
                "title": "Mumbai cricket match",
                "link": "https://toi.example/cricket",
                "description": "IPL action",
                "source_name": "Times of India",
                "country": ["india"],
                "pubDate": "2024-05-01 08:00:00",
                "image_url": "https://toi.example/img.jpg"
            }],
            "nextPage": "cursor-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let outcome = client
        .fetch_page(&PageRequest {
            category: Category::Sports,
            country: Some("in".to_string()),
            page: Some("cursor-1".to_string()),
        })
        .await
        .unwrap();

    match outcome {
        PageOutcome::Page { articles, next_page } => {
            assert_eq!(next_page.as_deref(), Some("cursor-2"));
            assert_eq!(articles.len(), 1);
            assert_eq!(articles[0].id, "abc123");
            assert_eq!(articles[0].image_url.as_deref(), Some("https://toi.example/img.jpg"));
        }
        other => panic!("expected a page, got {:?}", other),
    }
}

#[tokio::test]
async fn rate_limit_body_on_429_is_detected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "status": "error",
            "results": {"message": "Rate limit exceeded", "code": "RateLimitExceeded"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let outcome = client
        .fetch_page(&PageRequest {
            category: Category::Health,
            country: None,
            page: None,
        })
        .await
        .unwrap();
    assert!(matches!(outcome, PageOutcome::RateLimited { .. }));
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_page(&PageRequest {
            category: Category::Crime,
            country: None,
            page: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn html_scraper_reads_paragraphs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body><p>Lead paragraph.</p><p>Second paragraph.</p></body></html>"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let scraper = HtmlScraper::new("news-hub-test", Duration::from_secs(5)).unwrap();
    let text = scraper.scrape(&format!("{}/story", server.uri())).await.unwrap();
    assert_eq!(text.as_deref(), Some("Lead paragraph.\n\nSecond paragraph."));

    let missing = scraper.scrape(&format!("{}/gone", server.uri())).await.unwrap();
    assert!(missing.is_none());
    assert!(scraper.scrape("  ").await.unwrap().is_none());
}
