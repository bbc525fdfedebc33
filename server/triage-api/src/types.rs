//! Request/response types for the triage API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use triage_engine::types::{IncidentType, LogRecord, Severity, SignalEntry, SignalVector};
use triage_engine::AnalysisResult;
use uuid::Uuid;

/// Body of a successful `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
  pub incident_id: Uuid,
  pub normalized_logs: Vec<LogRecord>,
  pub signals: Vec<SignalEntry>,
  pub incident_type: IncidentType,
  pub risk_score: u8,
  pub severity: Severity,
  pub explanation: String,
  pub created_at: DateTime<Utc>,
}

impl AnalyzeResponse {
  pub fn new(id: Uuid, created_at: DateTime<Utc>, result: AnalysisResult) -> Self {
    Self {
      incident_id: id,
      signals: result.signals.entries(),
      normalized_logs: result.normalized_logs,
      incident_type: result.incident_type,
      risk_score: result.risk_score,
      severity: result.severity,
      explanation: result.explanation,
      created_at,
    }
  }
}

/// One stored incident. Normalized logs are not kept; the full signal
/// vector is, and it goes out flattened like in [`AnalyzeResponse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIncident {
  pub id: Uuid,
  pub incident_type: IncidentType,
  pub severity: Severity,
  pub risk_score: u8,
  #[serde(serialize_with = "serialize_entries")]
  pub signals: SignalVector,
  pub explanation: String,
  pub created_at: DateTime<Utc>,
}

fn serialize_entries<S: Serializer>(signals: &SignalVector, serializer: S) -> Result<S::Ok, S::Error> {
  signals.entries().serialize(serializer)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: String,
}
