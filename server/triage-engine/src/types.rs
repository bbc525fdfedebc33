//! Core types for the triage engine (JSON contracts + pipeline models).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Parser output (transient)
// ---------------------------------------------------------------------------

/// Loosely-typed candidate fields pulled out of one raw line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
  pub timestamp: Option<String>,
  pub level: Option<String>,
  pub service: Option<String>,
  pub message: Option<String>,
}

/// All four fields present and trimmed (after defaulting).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
  pub timestamp: String,
  pub level: String,
  pub service: String,
  pub message: String,
}

// ---------------------------------------------------------------------------
// Log level (normalized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
  Debug,
  Info,
  Warn,
  Error,
}

impl LogLevel {
  /// Exact (already upper-cased) match against the closed set.
  pub fn from_upper(s: &str) -> Option<Self> {
    match s {
      "DEBUG" => Some(Self::Debug),
      "INFO" => Some(Self::Info),
      "WARN" => Some(Self::Warn),
      "ERROR" => Some(Self::Error),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Debug => "DEBUG",
      Self::Info => "INFO",
      Self::Warn => "WARN",
      Self::Error => "ERROR",
    }
  }
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ---------------------------------------------------------------------------
// Event type (per line)
// ---------------------------------------------------------------------------

/// Cause category of a single log message. Declaration order is the canonical
/// iteration order (frequency maps and explanations follow it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
  DbTimeout,
  AuthFailure,
  ConnectionError,
  RateLimit,
  ValidationError,
  ServerError,
  Unknown,
}

impl EventType {
  pub const ALL: [EventType; 7] = [
    Self::DbTimeout,
    Self::AuthFailure,
    Self::ConnectionError,
    Self::RateLimit,
    Self::ValidationError,
    Self::ServerError,
    Self::Unknown,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::DbTimeout => "DB_TIMEOUT",
      Self::AuthFailure => "AUTH_FAILURE",
      Self::ConnectionError => "CONNECTION_ERROR",
      Self::RateLimit => "RATE_LIMIT",
      Self::ValidationError => "VALIDATION_ERROR",
      Self::ServerError => "SERVER_ERROR",
      Self::Unknown => "UNKNOWN",
    }
  }
}

impl fmt::Display for EventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One fully normalized, classified log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
  /// Canonical ISO-8601 UTC instant, e.g. `2024-01-15T10:30:00.000Z`.
  pub timestamp: String,
  pub level: LogLevel,
  pub service: String,
  pub message: String,
  pub event_type: EventType,
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Aggregated features for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalVector {
  pub error_spike_count: u64,
  /// Always holds all seven event types (zero-filled).
  pub event_type_frequencies: BTreeMap<EventType, u64>,
}

impl SignalVector {
  pub fn zeroed() -> Self {
    Self {
      error_spike_count: 0,
      event_type_frequencies: EventType::ALL.iter().map(|&et| (et, 0)).collect(),
    }
  }

  pub fn frequency(&self, event_type: EventType) -> u64 {
    self
      .event_type_frequencies
      .get(&event_type)
      .copied()
      .unwrap_or(0)
  }

  pub fn total_events(&self) -> u64 {
    self
      .event_type_frequencies
      .values()
      .fold(0u64, |acc, &n| acc.saturating_add(n))
  }

  /// Flattened view: an `ErrorSpike` entry (if any) followed by every
  /// nonzero frequency in event-type order.
  pub fn entries(&self) -> Vec<SignalEntry> {
    let mut out = Vec::new();
    if self.error_spike_count > 0 {
      out.push(SignalEntry {
        signal_type: "ErrorSpike".to_string(),
        count: self.error_spike_count,
      });
    }
    for et in EventType::ALL {
      let count = self.frequency(et);
      if count > 0 {
        out.push(SignalEntry {
          signal_type: et.as_str().to_string(),
          count,
        });
      }
    }
    out
  }
}

impl Default for SignalVector {
  fn default() -> Self {
    Self::zeroed()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEntry {
  #[serde(rename = "type")]
  pub signal_type: String,
  pub count: u64,
}

// ---------------------------------------------------------------------------
// Incident classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentType {
  DatabaseDegradation,
  AuthenticationBreach,
  ConnectivityIssue,
  ServiceOverload,
  DataIntegrity,
  InfrastructureFailure,
  UnknownIncident,
}

impl IncidentType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::DatabaseDegradation => "DATABASE_DEGRADATION",
      Self::AuthenticationBreach => "AUTHENTICATION_BREACH",
      Self::ConnectivityIssue => "CONNECTIVITY_ISSUE",
      Self::ServiceOverload => "SERVICE_OVERLOAD",
      Self::DataIntegrity => "DATA_INTEGRITY",
      Self::InfrastructureFailure => "INFRASTRUCTURE_FAILURE",
      Self::UnknownIncident => "UNKNOWN_INCIDENT",
    }
  }
}

impl fmt::Display for IncidentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
  Low,
  Medium,
  High,
  Critical,
}

impl Severity {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "LOW",
      Self::Medium => "MEDIUM",
      Self::High => "HIGH",
      Self::Critical => "CRITICAL",
    }
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what callers receive)
// ---------------------------------------------------------------------------

/// Shown in place of a generated write-up when the generator fails.
pub const EXPLANATION_UNAVAILABLE: &str = "AI explanation unavailable (local model error).";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
  pub normalized_logs: Vec<LogRecord>,
  pub signals: SignalVector,
  pub incident_type: IncidentType,
  pub risk_score: u8,
  pub severity: Severity,
  pub explanation: String,
}

impl AnalysisResult {
  /// Everything an explanation generator gets to see: the verdict plus the
  /// first `sample_size` normalized records.
  pub fn explanation_context(&self, sample_size: usize) -> ExplanationContext {
    ExplanationContext {
      incident_type: self.incident_type,
      severity: self.severity,
      risk_score: self.risk_score,
      signals: self.signals.clone(),
      sample_logs: self
        .normalized_logs
        .iter()
        .take(sample_size)
        .cloned()
        .collect(),
    }
  }

  /// Replace the rule-based explanation with generated text. A failed or
  /// empty generation yields [`EXPLANATION_UNAVAILABLE`]; the verdict fields
  /// are never touched.
  pub fn with_generated_explanation<E: fmt::Display>(mut self, outcome: Result<String, E>) -> Self {
    self.explanation = match outcome {
      Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
      Ok(_) => {
        tracing::warn!("explanation generator returned empty text");
        EXPLANATION_UNAVAILABLE.to_string()
      }
      Err(e) => {
        tracing::warn!(error = %e, "explanation generator failed");
        EXPLANATION_UNAVAILABLE.to_string()
      }
    };
    self
  }
}

/// Request contract for an external explanation generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationContext {
  pub incident_type: IncidentType,
  pub severity: Severity,
  pub risk_score: u8,
  pub signals: SignalVector,
  pub sample_logs: Vec<LogRecord>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zeroed_signals_cover_every_event_type() {
    let s = SignalVector::zeroed();
    assert_eq!(s.event_type_frequencies.len(), EventType::ALL.len());
    assert_eq!(s.total_events(), 0);
  }

  #[test]
  fn enums_serialize_screaming() {
    assert_eq!(serde_json::to_string(&EventType::DbTimeout).unwrap(), "\"DB_TIMEOUT\"");
    assert_eq!(
      serde_json::to_string(&IncidentType::UnknownIncident).unwrap(),
      "\"UNKNOWN_INCIDENT\""
    );
    assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"CRITICAL\"");
    assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"WARN\"");
  }

  #[test]
  fn serialized_signal_keys_match_display() {
    let json = serde_json::to_value(SignalVector::zeroed()).unwrap();
    let freqs = json["eventTypeFrequencies"].as_object().unwrap();
    for et in EventType::ALL {
      assert!(freqs.contains_key(et.as_str()), "missing {}", et);
    }
    assert_eq!(json["errorSpikeCount"], 0);
  }

  #[test]
  fn entries_skip_zero_counts() {
    let mut s = SignalVector::zeroed();
    s.error_spike_count = 2;
    s.event_type_frequencies.insert(EventType::RateLimit, 3);
    let entries = s.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].signal_type, "ErrorSpike");
    assert_eq!(entries[1].signal_type, "RATE_LIMIT");
    assert_eq!(entries[1].count, 3);
  }

  #[test]
  fn severity_is_ordered() {
    assert!(Severity::Low < Severity::Medium);
    assert!(Severity::High < Severity::Critical);
  }

  fn sample_result() -> AnalysisResult {
    AnalysisResult {
      normalized_logs: Vec::new(),
      signals: SignalVector::zeroed(),
      incident_type: IncidentType::UnknownIncident,
      risk_score: 0,
      severity: Severity::Low,
      explanation: "Incident: UNKNOWN_INCIDENT. Signals: .".into(),
    }
  }

  #[test]
  fn failed_generation_uses_placeholder() {
    let r = sample_result().with_generated_explanation::<String>(Err("timeout".into()));
    assert_eq!(r.explanation, EXPLANATION_UNAVAILABLE);
    assert_eq!(r.incident_type, IncidentType::UnknownIncident);
    assert_eq!(r.risk_score, 0);
  }

  #[test]
  fn empty_generation_uses_placeholder() {
    let r = sample_result().with_generated_explanation::<String>(Ok("   ".into()));
    assert_eq!(r.explanation, EXPLANATION_UNAVAILABLE);
  }

  #[test]
  fn generated_text_is_trimmed() {
    let r = sample_result().with_generated_explanation::<String>(Ok("\n## Summary\n".into()));
    assert_eq!(r.explanation, "## Summary");
  }
}
