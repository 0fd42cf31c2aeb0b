use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::service::{PromptRequest, ScoreRequest, ScoringService};

/// Router builder exposing the scoring and judge-prompt endpoints.
pub fn scoring_router(service: Arc<ScoringService>) -> Router {
    Router::new()
        .route("/api/v1/score", post(score_handler))
        .route("/api/v1/prompt", post(prompt_handler))
        .with_state(service)
}

pub(crate) async fn score_handler(
    State(service): State<Arc<ScoringService>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response {
    match service.score(request) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn prompt_handler(
    State(service): State<Arc<ScoringService>>,
    axum::Json(request): axum::Json<PromptRequest>,
) -> Response {
    match service.prompt(&request) {
        Ok(messages) => {
            let payload = json!({ "messages": messages });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
