//! Request handlers for the zip/unzip endpoints.
//!
//! Both handlers parse the body themselves instead of using `Json<T>`: the
//! file browser posts JSON without a JSON content type, and parse failures
//! must come back in the `{ success, error }` envelope.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::domain::model::{
    ArchiveRequest, ArchiveResponse, ErrorResponse, ExtractRequest, ExtractResponse,
};
use crate::server::AppState;
use crate::utils::error::{ArchiveError, ErrorCategory};

impl IntoResponse for ArchiveError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ArchiveError> {
    serde_json::from_slice(body)
        .map_err(|e| ArchiveError::invalid_request(format!("Malformed JSON body: {}", e)))
}

fn log_failure(tag: &str, err: &ArchiveError) {
    match err.category() {
        ErrorCategory::Operational | ErrorCategory::Configuration => {
            tracing::error!("[{}] Failed: {}", tag, err)
        }
        category => tracing::warn!("[{}] Rejected ({:?}): {}", tag, category, err),
    }
}

pub async fn create_archive(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ArchiveResponse>, ArchiveError> {
    let request: ArchiveRequest = parse_body(&body).inspect_err(|e| log_failure("ZIP", e))?;
    tracing::info!("[ZIP] Called with params: {:?}", request);

    let archiver = state.archiver.clone();
    let outcome = tokio::task::spawn_blocking(move || archiver.create_archive(&request))
        .await
        .map_err(ArchiveError::from)
        .and_then(|result| result)
        .inspect_err(|e| log_failure("ZIP", e))?;

    Ok(Json(outcome.into()))
}

pub async fn extract_archive(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ExtractResponse>, ArchiveError> {
    let request: ExtractRequest = parse_body(&body).inspect_err(|e| log_failure("UNZIP", e))?;
    tracing::info!("[UNZIP] Called with params: {:?}", request);

    let extractor = state.extractor.clone();
    let outcome = tokio::task::spawn_blocking(move || extractor.extract_archive(&request))
        .await
        .map_err(ArchiveError::from)
        .and_then(|result| result)
        .inspect_err(|e| log_failure("UNZIP", e))?;

    Ok(Json(outcome.into()))
}

pub async fn health() -> &'static str {
    "OK"
}
