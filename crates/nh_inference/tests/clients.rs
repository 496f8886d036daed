//! Integration tests for the HTTP model clients using wiremock.

use std::time::Duration;

use nh_core::{Embedder, Error, LanguageModel, ZeroShotClassifier};
use nh_inference::{ChatModel, HfZeroShotClassifier, TeiEmbedder};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn chat_model_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "gemini-1.5-pro"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "cricket world cup final"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = ChatModel::new("test-key".to_string(), &server.uri(), "gemini-1.5-pro", Duration::from_secs(5))
        .expect("model construction should not fail");
    let text = model.generate("Enhance this search query").await.unwrap();
    assert_eq!(text, "cricket world cup final");
}

#[tokio::test]
async fn chat_model_surfaces_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let model = ChatModel::new("k".to_string(), &server.uri(), "m", Duration::from_secs(5)).unwrap();
    let result = model.generate("hello").await;
    assert!(matches!(result, Err(Error::Inference(_))));
}

#[tokio::test]
async fn chat_model_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let model = ChatModel::new("k".to_string(), &server.uri(), "m", Duration::from_millis(200)).unwrap();
    let result = model.generate("hello").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn tei_embedder_batches_and_normalizes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(body_partial_json(json!({"normalize": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[3.0, 4.0], [0.0, 2.0]])))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = TeiEmbedder::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let vectors = embedder
        .embed(&["first text".to_string(), "second text".to_string()], true)
        .await
        .unwrap();
    assert_eq!(vectors, vec![vec![0.6, 0.8], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn tei_embedder_rejects_count_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[1.0, 0.0]])))
        .mount(&server)
        .await;

    let embedder = TeiEmbedder::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let result = embedder.embed(&["a".to_string(), "b".to_string()], false).await;
    assert!(matches!(result, Err(Error::Inference(_))));
}

#[tokio::test]
async fn zero_shot_sends_candidate_labels() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/bart-large-mnli"))
        .and(body_partial_json(json!({
            "parameters": {"candidate_labels": ["sports", "politics"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sequence": "Mumbai cricket match",
            "labels": ["sports", "politics"],
            "scores": [0.92, 0.08]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = HfZeroShotClassifier::new(
        &format!("{}/models/bart-large-mnli", server.uri()),
        Some("hf-token".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    let result = classifier
        .classify("Mumbai cricket match", &["sports", "politics"])
        .await
        .unwrap();
    assert_eq!(result.top(), Some(("sports", 0.92)));
}
