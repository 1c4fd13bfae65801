use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::service::{RecommendError, RecommendationService};
use crate::catalog::{CatalogError, CatalogProvider};
use crate::matching::ValidationError;

/// Router builder exposing the ranking and catalog health endpoints.
pub fn recommendation_router<P>(service: Arc<RecommendationService<P>>) -> Router
where
    P: CatalogProvider + 'static,
{
    Router::new()
        .route("/api/v1/recommend", post(recommend_handler::<P>))
        .route("/api/v1/catalog/health", get(catalog_health_handler::<P>))
        .with_state(service)
}

pub(crate) async fn recommend_handler<P>(
    State(service): State<Arc<RecommendationService<P>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    P: CatalogProvider + 'static,
{
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    // Catalog providers may read from disk.
    let outcome = tokio::task::spawn_blocking(move || service.recommend(&payload)).await;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => return worker_failure(err),
    };

    match outcome {
        Ok(ranking) => {
            let body = json!({
                "success": true,
                "rankings": ranking.results,
                "total_programs": ranking.total_programs(),
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(RecommendError::Validation(ValidationError::MissingFields { missing })) => {
            let body = json!({
                "error": "Missing required fields",
                "missing": missing,
            });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(RecommendError::Validation(other)) => {
            let body = json!({ "error": other.to_string() });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(RecommendError::Catalog(err)) => catalog_failure(err),
    }
}

pub(crate) async fn catalog_health_handler<P>(
    State(service): State<Arc<RecommendationService<P>>>,
) -> Response
where
    P: CatalogProvider + 'static,
{
    match tokio::task::spawn_blocking(move || service.catalog_keys()).await {
        Ok(Ok(keys)) => (StatusCode::OK, Json(json!({ "ok": true, "keys": keys }))).into_response(),
        Ok(Err(err)) => catalog_failure(err),
        Err(err) => worker_failure(err),
    }
}

fn malformed_body(rejection: JsonRejection) -> Response {
    let body = json!({ "error": rejection.body_text() });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn worker_failure(err: tokio::task::JoinError) -> Response {
    error!(error = %err, "ranking task did not complete");
    let body = json!({ "error": "internal error while ranking programs" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn catalog_failure(err: CatalogError) -> Response {
    let status = if err.is_upstream() {
        warn!(error = %err, "catalog store unavailable");
        StatusCode::BAD_GATEWAY
    } else {
        error!(error = %err, "catalog unusable");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
