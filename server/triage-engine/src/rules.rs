//! Signal vector → incident type, via two ordered rule tiers.
//!
//! Rules are plain data: an incident type plus a [`Condition`] tree. The
//! strict tier is evaluated first; if nothing fires, the fallback tier runs
//! with lower thresholds. Within a tier the first matching rule wins.

use serde::Serialize;

use crate::types::{EventType, IncidentType, SignalVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
  /// Frequency of one event type is at least `min`.
  EventsAtLeast { event_type: EventType, min: u64 },
  /// Error spike count is at least `min`.
  SpikesAtLeast { min: u64 },
  AnyOf(&'static [Condition]),
  AllOf(&'static [Condition]),
  /// Any frequency or the spike count is nonzero.
  AnySignal,
}

impl Condition {
  pub fn holds(&self, s: &SignalVector) -> bool {
    match self {
      Self::EventsAtLeast { event_type, min } => s.frequency(*event_type) >= *min,
      Self::SpikesAtLeast { min } => s.error_spike_count >= *min,
      Self::AnyOf(parts) => parts.iter().any(|c| c.holds(s)),
      Self::AllOf(parts) => parts.iter().all(|c| c.holds(s)),
      Self::AnySignal => s.total_events() > 0 || s.error_spike_count > 0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rule {
  pub incident: IncidentType,
  pub condition: Condition,
}

/// High-confidence thresholds.
pub const STRICT_RULES: &[Rule] = &[
  Rule {
    incident: IncidentType::DatabaseDegradation,
    condition: Condition::AnyOf(&[
      Condition::EventsAtLeast { event_type: EventType::DbTimeout, min: 2 },
      Condition::SpikesAtLeast { min: 3 },
    ]),
  },
  Rule {
    incident: IncidentType::AuthenticationBreach,
    condition: Condition::EventsAtLeast { event_type: EventType::AuthFailure, min: 2 },
  },
  Rule {
    incident: IncidentType::ConnectivityIssue,
    condition: Condition::AnyOf(&[
      Condition::EventsAtLeast { event_type: EventType::ConnectionError, min: 2 },
      Condition::SpikesAtLeast { min: 2 },
    ]),
  },
  Rule {
    incident: IncidentType::ServiceOverload,
    condition: Condition::AnyOf(&[
      Condition::EventsAtLeast { event_type: EventType::RateLimit, min: 2 },
      Condition::AllOf(&[
        Condition::EventsAtLeast { event_type: EventType::ServerError, min: 2 },
        Condition::SpikesAtLeast { min: 1 },
      ]),
    ]),
  },
  Rule {
    incident: IncidentType::DataIntegrity,
    condition: Condition::EventsAtLeast { event_type: EventType::ValidationError, min: 3 },
  },
  Rule {
    incident: IncidentType::InfrastructureFailure,
    condition: Condition::AnyOf(&[
      Condition::EventsAtLeast { event_type: EventType::ServerError, min: 3 },
      Condition::SpikesAtLeast { min: 5 },
    ]),
  },
];

/// Permissive thresholds, same category order, plus a catch-all. The
/// catch-all fires for any nonzero signal, UNKNOWN events included.
pub const FALLBACK_RULES: &[Rule] = &[
  Rule {
    incident: IncidentType::DatabaseDegradation,
    condition: Condition::EventsAtLeast { event_type: EventType::DbTimeout, min: 1 },
  },
  Rule {
    incident: IncidentType::AuthenticationBreach,
    condition: Condition::EventsAtLeast { event_type: EventType::AuthFailure, min: 1 },
  },
  Rule {
    incident: IncidentType::ConnectivityIssue,
    condition: Condition::AnyOf(&[
      Condition::EventsAtLeast { event_type: EventType::ConnectionError, min: 1 },
      Condition::SpikesAtLeast { min: 1 },
    ]),
  },
  Rule {
    incident: IncidentType::ServiceOverload,
    condition: Condition::AnyOf(&[
      Condition::EventsAtLeast { event_type: EventType::RateLimit, min: 1 },
      Condition::AllOf(&[
        Condition::EventsAtLeast { event_type: EventType::ServerError, min: 1 },
        Condition::SpikesAtLeast { min: 1 },
      ]),
    ]),
  },
  Rule {
    incident: IncidentType::DataIntegrity,
    condition: Condition::EventsAtLeast { event_type: EventType::ValidationError, min: 1 },
  },
  Rule {
    incident: IncidentType::InfrastructureFailure,
    condition: Condition::EventsAtLeast { event_type: EventType::ServerError, min: 1 },
  },
  Rule {
    incident: IncidentType::InfrastructureFailure,
    condition: Condition::AnySignal,
  },
];

fn first_match(rules: &[Rule], s: &SignalVector) -> Option<IncidentType> {
  rules.iter().find(|r| r.condition.holds(s)).map(|r| r.incident)
}

/// Strict tier, then fallback tier; all-zero signals are UNKNOWN_INCIDENT.
pub fn apply_rules(signals: &SignalVector) -> IncidentType {
  first_match(STRICT_RULES, signals)
    .or_else(|| first_match(FALLBACK_RULES, signals))
    .unwrap_or(IncidentType::UnknownIncident)
}

/// Short summary of the signals behind a verdict, e.g.
/// `Incident: AUTHENTICATION_BREACH. Signals: 1 error spike(s); event types: AUTH_FAILURE: 1.`
pub fn explain_incident(signals: &SignalVector, incident: IncidentType) -> String {
  let mut parts = Vec::new();
  if signals.error_spike_count > 0 {
    parts.push(format!("{} error spike(s)", signals.error_spike_count));
  }

  let nonzero: Vec<String> = EventType::ALL
    .iter()
    .filter_map(|&et| {
      let count = signals.frequency(et);
      (count > 0).then(|| format!("{}: {}", et, count))
    })
    .collect();
  if !nonzero.is_empty() {
    parts.push(format!("event types: {}", nonzero.join(", ")));
  }

  format!("Incident: {}. Signals: {}.", incident, parts.join("; "))
}
