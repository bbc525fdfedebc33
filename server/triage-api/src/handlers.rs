//! HTTP handlers for the triage API.

use axum::{
  extract::{Path, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use triage_engine::{batch, EngineError};
use uuid::Uuid;

use crate::explain;
use crate::state::AppState;
use crate::types::{AnalyzeResponse, ErrorBody, StoredIncident};

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Body must include 'logs' as an array of strings ({0})")]
  InvalidBody(#[from] EngineError),

  #[error("incident {0} not found")]
  NotFound(Uuid),

  #[error("internal error: {0}")]
  Internal(String),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ErrorBody {
      error: self.to_string(),
    };
    (status, Json(body)).into_response()
  }
}

pub async fn health() -> &'static str {
  "ok"
}

pub async fn analyze(
  State(state): State<Arc<AppState>>,
  body: String,
) -> Result<Json<AnalyzeResponse>, ApiError> {
  let logs = batch::parse_batch_str(&body).map_err(|e| {
    warn!(error = %e, "rejected analyze request");
    ApiError::from(e)
  })?;

  let engine = state.engine.clone();
  let mut result = tokio::task::spawn_blocking(move || engine.analyze(&logs))
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

  if let Some(explainer) = &state.explainer {
    let ctx = state.engine.explanation_context(&result);
    let outcome = explain::generate_with_timeout(explainer.as_ref(), &ctx, state.explain_timeout).await;
    result = result.with_generated_explanation(outcome);
  }

  let stored = state.store.insert(&result).await;
  info!(
    id = %stored.id,
    incident = %stored.incident_type,
    risk_score = stored.risk_score,
    "incident stored"
  );
  Ok(Json(AnalyzeResponse::new(stored.id, stored.created_at, result)))
}

/// `GET /analyze`: point callers at the POST form.
pub async fn analyze_usage() -> impl IntoResponse {
  (
    StatusCode::METHOD_NOT_ALLOWED,
    [(header::ALLOW, "POST")],
    Json(ErrorBody {
      error: "Use POST with a JSON body: {\"logs\": [\"<log line>\", ...]}".to_string(),
    }),
  )
}

pub async fn list_incidents(State(state): State<Arc<AppState>>) -> Json<Vec<StoredIncident>> {
  Json(state.store.list().await)
}

pub async fn get_incident(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StoredIncident>, ApiError> {
  state.store.get(id).await.map(Json).ok_or(ApiError::NotFound(id))
}
