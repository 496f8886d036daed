use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use nh_core::{Category, Region, TrendingResponse};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

fn default_max_results() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn trending_reply(response: TrendingResponse) -> (StatusCode, Json<TrendingResponse>) {
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(response))
}

fn bad_request(message: String) -> (StatusCode, Json<TrendingResponse>) {
    (StatusCode::BAD_REQUEST, Json(TrendingResponse::failure(message)))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "news-hub",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn all_trending(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    trending_reply(state.orchestrator.get_trending(None, None).await)
}

pub async fn region_trending(State(state): State<Arc<AppState>>, Path(region): Path<String>) -> impl IntoResponse {
    let region: Region = match region.parse() {
        Ok(region) => region,
        Err(_) => return bad_request("Region must be 'India' or 'Global'".to_string()),
    };
    trending_reply(state.orchestrator.get_trending(Some(region), None).await)
}

pub async fn category_trending(
    State(state): State<Arc<AppState>>,
    Path((region, category)): Path<(String, String)>,
) -> impl IntoResponse {
    let region: Region = match region.parse() {
        Ok(region) => region,
        Err(_) => return bad_request("Region must be 'India' or 'Global'".to_string()),
    };
    let Some(category) = Category::from_label(&category) else {
        let labels: Vec<&str> = Category::TOPICS.iter().map(Category::as_str).collect();
        return bad_request(format!("Category must be one of: {}", labels.join(", ")));
    };
    trending_reply(state.orchestrator.get_trending(Some(region), Some(category)).await)
}

pub async fn query(State(state): State<Arc<AppState>>, Json(request): Json<QueryRequest>) -> impl IntoResponse {
    tracing::info!("💬 Query '{}' (max {})", request.query, request.max_results);
    Json(state.orchestrator.answer_query(&request.query, request.max_results).await)
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.orchestrator.invalidate().await;
    Json(json!({ "success": true, "message": "Trending cache cleared" }))
}
