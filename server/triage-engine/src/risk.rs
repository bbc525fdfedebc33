//! Risk score (0 to 100) and severity buckets.

use crate::types::{IncidentType, Severity, SignalVector};

const SPIKE_POINTS: u64 = 15;
const SPIKE_CAP: u64 = 40;
const EVENT_POINTS: u64 = 5;
const EVENT_CAP: u64 = 50;

/// How much an incident type amplifies the raw signal score.
pub fn incident_weight(incident: IncidentType) -> f64 {
  match incident {
    IncidentType::DatabaseDegradation => 0.8,
    IncidentType::AuthenticationBreach => 1.0,
    IncidentType::ConnectivityIssue => 0.7,
    IncidentType::ServiceOverload => 0.6,
    IncidentType::DataIntegrity => 0.5,
    IncidentType::InfrastructureFailure => 0.9,
    IncidentType::UnknownIncident => 0.2,
  }
}

/// Capped spike + event contributions, weighted by incident type, clamped and rounded.
pub fn risk_score(signals: &SignalVector, incident: IncidentType) -> u8 {
  let spike_contrib = signals.error_spike_count.saturating_mul(SPIKE_POINTS).min(SPIKE_CAP);
  let event_contrib = signals.total_events().saturating_mul(EVENT_POINTS).min(EVENT_CAP);
  let raw = (spike_contrib + event_contrib) as f64 * incident_weight(incident);
  raw.clamp(0.0, 100.0).round() as u8
}

/// Lower bound of each band is inclusive.
pub fn assess_severity(score: u8) -> Severity {
  match score {
    80.. => Severity::Critical,
    60..=79 => Severity::High,
    30..=59 => Severity::Medium,
    _ => Severity::Low,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::EventType;

  fn signals(spikes: u64, events: u64) -> SignalVector {
    let mut s = SignalVector::zeroed();
    s.error_spike_count = spikes;
    s.event_type_frequencies.insert(EventType::Unknown, events);
    s
  }

  #[test]
  fn empty_scores_zero() {
    assert_eq!(risk_score(&SignalVector::zeroed(), IncidentType::UnknownIncident), 0);
  }

  #[test]
  fn contributions_are_capped() {
    // (40 + 50) * 1.0
    assert_eq!(risk_score(&signals(100, 1000), IncidentType::AuthenticationBreach), 90);
    assert_eq!(risk_score(&signals(u64::MAX, u64::MAX), IncidentType::AuthenticationBreach), 90);
  }

  #[test]
  fn weights_apply() {
    // (15 + 15) * 0.8 = 24
    assert_eq!(risk_score(&signals(1, 3), IncidentType::DatabaseDegradation), 24);
    // (30 + 20) * 0.7 = 35
    assert_eq!(risk_score(&signals(2, 4), IncidentType::ConnectivityIssue), 35);
  }

  #[test]
  fn rounding_is_half_up() {
    // (0 + 5) * 0.5 = 2.5 -> 3
    assert_eq!(risk_score(&signals(0, 1), IncidentType::DataIntegrity), 3);
    // (0 + 5) * 0.9 = 4.5 -> 5
    assert_eq!(risk_score(&signals(0, 1), IncidentType::InfrastructureFailure), 5);
  }

  #[test]
  fn severity_bands() {
    assert_eq!(assess_severity(0), Severity::Low);
    assert_eq!(assess_severity(29), Severity::Low);
    assert_eq!(assess_severity(30), Severity::Medium);
    assert_eq!(assess_severity(59), Severity::Medium);
    assert_eq!(assess_severity(60), Severity::High);
    assert_eq!(assess_severity(79), Severity::High);
    assert_eq!(assess_severity(80), Severity::Critical);
    assert_eq!(assess_severity(100), Severity::Critical);
  }

  #[test]
  fn every_weight_is_a_fraction() {
    for it in [
      IncidentType::DatabaseDegradation,
      IncidentType::AuthenticationBreach,
      IncidentType::ConnectivityIssue,
      IncidentType::ServiceOverload,
      IncidentType::DataIntegrity,
      IncidentType::InfrastructureFailure,
      IncidentType::UnknownIncident,
    ] {
      let w = incident_weight(it);
      assert!(w > 0.0 && w <= 1.0, "{} weight {}", it, w);
    }
  }
}
