//! Log Triage API
//!
//! HTTP service that runs the triage engine over posted log batches, optionally
//! asks a local model for a write-up, and keeps incidents in memory.
//! Bind to 127.0.0.1 by default (internal only).

pub mod explain;
mod handlers;
mod state;
pub mod store;
mod types;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use explain::{ExplainError, Explainer, OllamaConfig, OllamaExplainer};
pub use handlers::{analyze, analyze_usage, get_incident, health, list_incidents, ApiError};
pub use state::AppState;
pub use store::IncidentStore;
pub use types::{AnalyzeResponse, ErrorBody, StoredIncident};

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/analyze", get(analyze_usage).post(analyze))
    .route("/incidents", get(list_incidents))
    .route("/incidents/:id", get(get_incident))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
