//! Map a standardized message to exactly one event type.
//!
//! The pattern table is evaluated top to bottom and the first match wins, so
//! the declared order is part of the contract. Specific phrasings sit ahead
//! of the generic ones inside each category, and the bare `timeout` entry sits
//! ahead of every CONNECTION_ERROR entry: an unqualified timeout is a
//! DB_TIMEOUT, including "connection timeout".

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::types::EventType;

/// Ordered (pattern, event type) table. Patterns are matched case-insensitively.
pub const PATTERNS: &[(&str, EventType)] = &[
  (r"\bdatabase\s+(?:connection\s+)?timeout\b", EventType::DbTimeout),
  (r"\bquery\s+timeout\b", EventType::DbTimeout),
  (r"\bdb\s+timeout\b", EventType::DbTimeout),
  (r"\bpg\s+timeout\b", EventType::DbTimeout),
  (r"\btimeout\b", EventType::DbTimeout),
  (r"\bconnection\s+timeout\b", EventType::ConnectionError),
  (r"\bECONNREFUSED\b", EventType::ConnectionError),
  (r"\bECONNRESET\b", EventType::ConnectionError),
  (r"\bconnection\s+refused\b", EventType::ConnectionError),
  (r"\bconnection\s+reset\b", EventType::ConnectionError),
  (r"\bconnect\s+ETIMEDOUT\b", EventType::ConnectionError),
  (r"\bnetwork\s+error\b", EventType::ConnectionError),
  (r"\bsocket\s+(?:hang\s+up|closed)\b", EventType::ConnectionError),
  (r"\binvalid\s+token\b", EventType::AuthFailure),
  (r"\bauth(?:entication)?\s+failed\b", EventType::AuthFailure),
  (r"\bunauthorized\b", EventType::AuthFailure),
  (r"\b401\b", EventType::AuthFailure),
  (r"\bjwt\s+(?:expired|invalid)\b", EventType::AuthFailure),
  (r"\brate\s+limit", EventType::RateLimit),
  (r"\b429\b", EventType::RateLimit),
  (r"\btoo\s+many\s+requests\b", EventType::RateLimit),
  (r"\bthrottl", EventType::RateLimit),
  (r"\bvalidation\s+(?:error|failed)\b", EventType::ValidationError),
  (r"\binvalid\s+(?:request|input|data)\b", EventType::ValidationError),
  (r"\b400\b", EventType::ValidationError),
  (r"\b500\b", EventType::ServerError),
  (r"\b502\b", EventType::ServerError),
  (r"\b503\b", EventType::ServerError),
  (r"\b504\b", EventType::ServerError),
  (r"\binternal\s+server\s+error\b", EventType::ServerError),
  (r"\bcrash\b", EventType::ServerError),
  (r"\bunhandled\s+exception\b", EventType::ServerError),
  (r"\b(?:uncaught\s+)?exception\b", EventType::ServerError),
  (r"\bfatal\s+error\b", EventType::ServerError),
  (r"\bout\s+of\s+memory\b", EventType::ServerError),
];

static COMPILED: LazyLock<Vec<(Regex, EventType)>> = LazyLock::new(|| {
  PATTERNS
    .iter()
    .map(|&(pattern, event_type)| {
      let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("invalid classifier pattern");
      (re, event_type)
    })
    .collect()
});

/// First matching pattern wins; no match is UNKNOWN.
pub fn classify(message: &str) -> EventType {
  COMPILED
    .iter()
    .find(|(re, _)| re.is_match(message))
    .map(|&(_, event_type)| event_type)
    .unwrap_or(EventType::Unknown)
}
