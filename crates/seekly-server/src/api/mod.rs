//! Thin HTTP surface over the scraping orchestrator.
//!
//! The endpoints impose no contract beyond the orchestrator's own:
//! `url` in, normalized records out. Errors other than "unknown site"
//! never surface — the orchestrator degrades them to empty result sets.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use seekly_core::SearchResult;
use seekly_scraper::{Orchestrator, ScrapeError};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    /// Listing URL to scrape.
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: Vec<SearchResult>,
    pub count: usize,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Build the application router. CORS is wide open; the service fronts a
/// development UI and carries no credentials.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/scrape", get(scrape))
        .route("/search", get(scrape))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Seekly API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "seekly-scraper",
    }))
}

async fn scrape(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Result<Json<ScrapeResponse>, (StatusCode, Json<ErrorDetail>)> {
    let source = state
        .orchestrator
        .source_for(&params.url)
        .unwrap_or("Unknown")
        .to_string();

    match state.orchestrator.acquire(&params.url).await {
        Ok(records) => Ok(Json(ScrapeResponse {
            success: true,
            count: records.len(),
            data: records,
            source,
        })),
        Err(err @ ScrapeError::UnsupportedSite { .. }) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorDetail {
                detail: err.to_string(),
            }),
        )),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDetail {
                detail: format!("Scraping failed: {err}"),
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use seekly_scraper::{PaginationLimits, PROVIDERS};
    use tower::ServiceExt;

    /// An app whose orchestrator has no strategies wired: supported URLs
    /// degrade to empty result sets, unsupported URLs error.
    fn test_app() -> Router {
        let orchestrator = Arc::new(Orchestrator::with_fetchers(
            PROVIDERS,
            Vec::new(),
            PaginationLimits::default(),
        ));
        build_app(AppState { orchestrator })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn health_endpoint_reports_healthy() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("handler runs");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "seekly-scraper");
    }

    #[tokio::test]
    async fn home_banner_includes_version() {
        let response = test_app()
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("handler runs");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn scrape_rejects_unknown_sites_with_detail() {
        let response = test_app()
            .oneshot(
                Request::get("/scrape?url=https://example.com/foo")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("handler runs");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(
            json["detail"]
                .as_str()
                .expect("detail present")
                .contains("no provider recognizes"),
            "detail: {json}"
        );
    }

    #[tokio::test]
    async fn scrape_returns_empty_success_when_strategies_yield_nothing() {
        let response = test_app()
            .oneshot(
                Request::get("/scrape?url=https://www.olx.com.pk/items/q-bike")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("handler runs");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 0);
        assert_eq!(json["source"], "OLX");
    }

    #[tokio::test]
    async fn search_is_an_alias_for_scrape() {
        let response = test_app()
            .oneshot(
                Request::get("/search?url=https://www.pakwheels.com/used-cars/search/-/q_civic/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("handler runs");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["source"], "PakWheels");
    }

    #[tokio::test]
    async fn scrape_without_url_parameter_is_a_client_error() {
        let response = test_app()
            .oneshot(Request::get("/scrape").body(Body::empty()).expect("request"))
            .await
            .expect("handler runs");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
