//! Core engine: runs the full pipeline over one batch of raw lines.

use tracing::{debug, info};

use crate::config::Config;
use crate::normalize;
use crate::risk;
use crate::rules;
use crate::signals;
use crate::types::*;

/// The log triage engine. Stateless across calls; holds only its config.
#[derive(Debug, Clone, Default)]
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Analyze one batch. Total: every input, including an empty batch,
  /// produces a result.
  pub fn analyze<S>(&self, lines: &[S]) -> AnalysisResult
  where
    S: AsRef<str> + Sync,
  {
    let normalized_logs = normalize::normalize_batch(lines, self.config.parallel_min_batch);
    let signals = signals::extract_signals(&normalized_logs, self.config.spike_window);
    let incident_type = rules::apply_rules(&signals);
    let risk_score = risk::risk_score(&signals, incident_type);
    let severity = risk::assess_severity(risk_score);
    let explanation = rules::explain_incident(&signals, incident_type);

    debug!(
      spikes = signals.error_spike_count,
      events = signals.total_events(),
      "signals extracted"
    );
    info!(
      lines = lines.len(),
      incident = %incident_type,
      risk_score,
      severity = %severity,
      "batch analyzed"
    );

    AnalysisResult {
      normalized_logs,
      signals,
      incident_type,
      risk_score,
      severity,
      explanation,
    }
  }

  /// The explanation request for `result`, sampled per this engine's config.
  pub fn explanation_context(&self, result: &AnalysisResult) -> ExplanationContext {
    result.explanation_context(self.config.explanation_sample_size)
  }
}

/// Analyze with the default configuration.
pub fn analyze<S>(lines: &[S]) -> AnalysisResult
where
  S: AsRef<str> + Sync,
{
  Engine::with_defaults().analyze(lines)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_batch_is_unknown_low() {
    let result = analyze::<&str>(&[]);
    assert!(result.normalized_logs.is_empty());
    assert_eq!(result.signals, SignalVector::zeroed());
    assert_eq!(result.incident_type, IncidentType::UnknownIncident);
    assert_eq!(result.risk_score, 0);
    assert_eq!(result.severity, Severity::Low);
  }

  #[test]
  fn mixed_batch_picks_auth_breach() {
    let result = analyze(&[
      "2024-01-15T10:30:00Z ERROR [api] Connection refused",
      "2024-01-15T10:30:01Z ERROR [auth] Invalid token provided",
      "2024-01-15T10:30:02Z WARN [api] Rate limit approaching",
    ]);
    assert_eq!(result.signals.frequency(EventType::ConnectionError), 1);
    assert_eq!(result.signals.frequency(EventType::AuthFailure), 1);
    assert_eq!(result.signals.frequency(EventType::RateLimit), 1);
    assert_eq!(result.signals.error_spike_count, 1);
    assert_eq!(result.incident_type, IncidentType::AuthenticationBreach);
    // (15 + 15) * 1.0
    assert_eq!(result.risk_score, 30);
    assert_eq!(result.severity, Severity::Medium);
  }

  #[test]
  fn repeated_db_timeouts_degrade_database() {
    let lines: Vec<String> = (0..4)
      .map(|i| format!("2024-01-15T10:3{}:00Z ERROR [orders] database timeout after 30s", i))
      .collect();
    let result = analyze(&lines);
    assert_eq!(result.incident_type, IncidentType::DatabaseDegradation);
    // (15 + 20) * 0.8 = 28
    assert_eq!(result.risk_score, 28);
    assert_eq!(result.severity, Severity::Low);
    assert!(result.explanation.starts_with("Incident: DATABASE_DEGRADATION."));
  }

  #[test]
  fn wider_spike_window_merges_clusters() {
    let mut lines = vec!["ERROR [a] boom"];
    lines.extend(std::iter::repeat("INFO [a] ok").take(6));
    lines.push("ERROR [a] boom");

    let narrow = analyze(&lines);
    assert_eq!(narrow.signals.error_spike_count, 2);

    let wide = Engine::new(Config {
      spike_window: 10,
      ..Config::default()
    })
    .analyze(&lines);
    assert_eq!(wide.signals.error_spike_count, 1);
  }

  #[test]
  fn explanation_context_samples_first_records() {
    let lines: Vec<String> = (0..8).map(|i| format!("INFO [svc] line {}", i)).collect();
    let engine = Engine::with_defaults();
    let result = engine.analyze(&lines);
    let ctx = engine.explanation_context(&result);
    assert_eq!(ctx.sample_logs.len(), 5);
    assert_eq!(ctx.sample_logs[0].message, "line 0");
    assert_eq!(ctx.incident_type, result.incident_type);
    assert_eq!(ctx.risk_score, result.risk_score);
  }
}
