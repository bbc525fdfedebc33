//! Canonical timestamps and levels.
//!
//! Every conversion here is total: anything that cannot be read as an
//! instant falls back to the current instant, and any unknown level becomes
//! INFO.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use tracing::debug;

use crate::types::{ExtractedFields, LogLevel};

/// Epoch values below this are seconds; at or above it, milliseconds.
const EPOCH_MILLIS_CUTOFF: i64 = 10_000_000_000;

/// Formats tried after the ISO, spaced, and epoch shapes, with a zone.
const GENERIC_ZONED_FORMATS: &[&str] = &["%d/%b/%Y:%H:%M:%S %z", "%Y/%m/%d %H:%M:%S%.f %z"];
/// Same, read as UTC.
const GENERIC_NAIVE_FORMATS: &[&str] = &["%Y/%m/%d %H:%M:%S%.f", "%Y/%m/%dT%H:%M:%S%.f", "%b %d %Y %H:%M:%S"];

static ISO_SHAPE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("invalid iso shape regex"));
static SPACED_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2}(?:\.\d+)?)").expect("invalid spaced shape regex")
});
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("invalid numeric regex"));

/// The standardizer's output: a LogRecord minus its event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standardized {
  pub timestamp: String,
  pub level: LogLevel,
  pub service: String,
  pub message: String,
}

pub fn standardize(fields: &ExtractedFields) -> Standardized {
  Standardized {
    timestamp: canonical_timestamp(&fields.timestamp),
    level: standardize_level(&fields.level),
    service: fields.service.trim().to_string(),
    message: fields.message.trim().to_string(),
  }
}

/// Upper-case and validate; anything outside the closed set is INFO.
pub fn standardize_level(level: &str) -> LogLevel {
  LogLevel::from_upper(&level.trim().to_ascii_uppercase()).unwrap_or(LogLevel::Info)
}

/// Canonical ISO-8601 UTC form with millisecond precision.
pub fn format_instant(dt: &DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_iso() -> String {
  format_instant(&Utc::now())
}

/// Convert any supported timestamp shape to the canonical form.
pub fn canonical_timestamp(value: &str) -> String {
  match parse_instant(value) {
    Some(dt) => format_instant(&dt),
    None => {
      debug!(value, "unreadable timestamp; using current instant");
      now_iso()
    }
  }
}

/// Read an instant from a timestamp string, trying the supported shapes in
/// order. Instants outside years 0..=9999 have no canonical form and are
/// treated as unreadable.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
  read_instant(value).filter(|dt| (0..=9999).contains(&dt.year()))
}

fn read_instant(value: &str) -> Option<DateTime<Utc>> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return None;
  }

  if ISO_SHAPE.is_match(trimmed) {
    // An ISO-shaped value that does not parse is not retried as anything else.
    return parse_iso(trimmed);
  }

  if let Some(caps) = SPACED_SHAPE.captures(trimmed) {
    let joined = format!("{}T{}", &caps[1], &caps[2]);
    return NaiveDateTime::parse_from_str(&joined, "%Y-%m-%dT%H:%M:%S%.f")
      .ok()
      .map(|naive| naive.and_utc());
  }

  if NUMERIC.is_match(trimmed) {
    return parse_epoch(trimmed);
  }

  parse_generic(trimmed)
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  // Offset without a colon, e.g. +0200.
  if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
    return Some(dt.with_timezone(&Utc));
  }
  // No zone at all: read as UTC.
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .ok()
    .map(|naive| naive.and_utc())
}

fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
  let n: i64 = s.parse().ok()?;
  if n < EPOCH_MILLIS_CUTOFF {
    DateTime::from_timestamp(n, 0)
  } else {
    DateTime::from_timestamp_millis(n)
  }
}

fn parse_generic(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
    return Some(dt.with_timezone(&Utc));
  }
  for fmt in GENERIC_ZONED_FORMATS {
    if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
      return Some(dt.with_timezone(&Utc));
    }
  }
  for fmt in GENERIC_NAIVE_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
      return Some(naive.and_utc());
    }
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}
