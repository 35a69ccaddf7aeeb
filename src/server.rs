//! HTTP server for filter extraction

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::url_params::{build_search_url, filters_to_url_params};
use crate::{ExtractionRequest, ExtractionResult, FilterEngine, FilterState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub remote_enabled: bool,
    pub fallbacks: u64,
}

/// Search URL response
#[derive(Debug, Serialize)]
pub struct SearchUrlResponse {
    pub url: String,
    pub params: Vec<(String, String)>,
}

/// Extract filters handler. Extraction never fails, so neither does this.
async fn extract_handler(
    State(engine): State<Arc<FilterEngine>>,
    Json(req): Json<ExtractionRequest>,
) -> Json<ExtractionResult> {
    info!(
        "Received extract request: query='{}', history={}",
        req.user_query,
        req.history.len()
    );

    let mut req = req;
    req.current_filters.normalize();

    let result = engine.extract_filters(&req).await;
    info!(
        "Extraction done: source={:?}, confidence={:.2}, suggestions={}",
        result.source,
        result.confidence,
        result.suggestions.len()
    );
    Json(result)
}

/// Map a filter state to its search page URL
async fn search_url_handler(Json(filters): Json<FilterState>) -> Json<SearchUrlResponse> {
    let filters = filters.normalized();
    Json(SearchUrlResponse {
        url: build_search_url(&filters),
        params: filters_to_url_params(&filters),
    })
}

/// Health check handler
async fn health_handler(State(engine): State<Arc<FilterEngine>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "ecofit-filters".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        remote_enabled: engine.remote_enabled(),
        fallbacks: engine.fallback_count(),
    })
}

/// Create and configure the HTTP server
pub fn create_router(engine: Arc<FilterEngine>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/extract", post(extract_handler))
        .route("/search_url", post(search_url_handler))
        .with_state(engine)
}

/// Run the HTTP server
pub async fn run_server(engine: Arc<FilterEngine>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting filter extraction server on {}", addr);

    let app = create_router(engine);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn spawn(engine: Arc<FilterEngine>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(engine)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_extract_endpoint() {
        let base = spawn(FilterEngine::local_only()).await;
        let client = reqwest::Client::new();

        let result: ExtractionResult = client
            .post(format!("{}/extract", base))
            .json(&serde_json::json!({
                "userQuery": "change to bottoms",
                "currentFilters": {"category": ["Tops"], "gender": []}
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(result.filters.category, Some(vec!["Bottoms".to_string()]));
        assert_eq!(result.filters.gender, None);
    }

    #[tokio::test]
    async fn test_extract_accepts_sort_and_page() {
        let base = spawn(FilterEngine::local_only()).await;
        let result: ExtractionResult = reqwest::Client::new()
            .post(format!("{}/extract", base))
            .json(&serde_json::json!({
                "userQuery": "in black",
                "currentFilters": {"category": ["Tops"], "sortBy": "rating", "page": 3}
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(result.filters.color, Some(vec!["Black".to_string()]));
        assert_eq!(result.filters.sort_by.as_deref(), Some("rating"));
        assert_eq!(result.filters.page, Some(3));
    }

    #[tokio::test]
    async fn test_search_url_endpoint() {
        let base = spawn(FilterEngine::local_only()).await;
        let body: serde_json::Value = reqwest::Client::new()
            .post(format!("{}/search_url", base))
            .json(&serde_json::json!({"size": ["M"], "maxPrice": 500}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["url"], "/search?size=M&maxPrice=500");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let base = spawn(FilterEngine::local_only()).await;
        let body: serde_json::Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["remote_enabled"], false);
    }
}
