// src/api/handlers.rs

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::{types::*, ApiState};
use crate::core::orchestrator::Orchestrator;
use crate::core::types::{EssayReport, EssayRequest};
use crate::infra::errors::RedraftError;

/// POST /api/v1/essays — Run the refine loop to completion and return the report.
pub async fn evaluate_essay(
    State(state): State<ApiState>,
    payload: Result<Json<EssayRequest>, JsonRejection>,
) -> Result<Json<EssayReport>, (StatusCode, Json<ErrorResponse>)> {
    // Out-of-range or mistyped fields are caller mistakes, same as an empty essay.
    let Json(body) = payload
        .map_err(|rej| error_response(RedraftError::InvalidInput(rej.body_text())))?;

    // Fresh orchestrator per request so token usage is per request.
    let orchestrator = Orchestrator::from_config(state.provider.clone(), &state.config);
    match orchestrator.run(body).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/v1/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Map a loop failure onto an HTTP status.
pub fn error_response(err: RedraftError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        RedraftError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RedraftError::MalformedResponse { .. } | RedraftError::GenerationFailure { .. } => {
            StatusCode::BAD_GATEWAY
        }
        RedraftError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::warn!(status = status.as_u16(), "Essay request failed: {}", err);
        if let Some(raw) = err.raw_response() {
            tracing::debug!("Raw model output: {}", crate::util::truncate_str(raw, 500));
        }
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            retryable: err.is_transient(),
            raw: err.raw_response().map(str::to_string),
        }),
    )
}
