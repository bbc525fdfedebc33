//! Split one raw log line into candidate fields.
//!
//! Tolerates JSON objects, key=value pairs, and free-text/syslog-like lines.
//! Never fails: anything unrecognized is simply left unset.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::standardize::format_instant;
use crate::types::RawFields;

const TIMESTAMP_KEYS: &[&str] = &["timestamp", "time", "ts", "@timestamp"];
const LEVEL_KEYS: &[&str] = &["level", "lvl", "severity", "log_level"];
const SERVICE_KEYS: &[&str] = &["service", "serviceName", "app", "logger"];
const MESSAGE_KEYS: &[&str] = &["message", "msg", "log", "text"];

static ISO_TS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?")
    .expect("invalid iso timestamp regex")
});
static SPACED_TS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}(?:\.\d+)?").expect("invalid spaced timestamp regex")
});
static EPOCH_TS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b(\d{10})(?:\.\d+)?\b").expect("invalid epoch regex"));
static LEVEL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\b(DEBUG|INFO|WARN|ERROR)\b").expect("invalid level regex"));
static SERVICE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)\[([^\]]+)\]|service[=:]\s*["']?([^"'\s,]+)|"service"\s*:\s*"([^"]+)""#)
    .expect("invalid service regex")
});
static MESSAGE_KV: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"message\s*=\s*"([^"]*)""#).expect("invalid message kv regex"));
static MSG_KV: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"msg\s*=\s*"([^"]*)""#).expect("invalid msg kv regex"));
static MESSAGE_JSON_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#""message"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("invalid message fragment regex")
});
static MESSAGE_TOKEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"(?i)message[=:]\s*["']?([^"'\n]+)"#).expect("invalid message token regex"));

/// Parse a raw line into whatever fields can be recognized.
pub fn parse_line(line: &str) -> RawFields {
  let trimmed = line.trim();

  if trimmed.starts_with('{') {
    match serde_json::from_str::<Value>(trimmed) {
      Ok(Value::Object(obj)) => return parse_json_object(&obj),
      Ok(_) => debug!("line starts with '{{' but is not a JSON object; using text heuristics"),
      Err(e) => debug!(error = %e, "json parse failed; using text heuristics"),
    }
  }

  parse_text(trimmed)
}

fn parse_json_object(obj: &Map<String, Value>) -> RawFields {
  RawFields {
    timestamp: first_string(obj, TIMESTAMP_KEYS).or_else(|| first_number(obj, TIMESTAMP_KEYS)),
    level: first_string(obj, LEVEL_KEYS),
    service: first_string(obj, SERVICE_KEYS),
    message: first_string(obj, MESSAGE_KEYS),
  }
}

/// First synonym key holding a non-empty string.
fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|k| match obj.get(*k) {
    Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
    _ => None,
  })
}

/// Numeric epochs in JSON payloads (`"ts": 1705314600`); the standardizer
/// decides between seconds and milliseconds.
fn first_number(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|k| match obj.get(*k) {
    Some(Value::Number(n)) => n.as_i64().map(|v| v.to_string()),
    _ => None,
  })
}

fn parse_text(line: &str) -> RawFields {
  let (timestamp, ts_text) = match extract_timestamp(line) {
    Some((value, text)) => (Some(value), Some(text)),
    None => (None, None),
  };
  let mut fields = RawFields {
    timestamp,
    level: LEVEL.captures(line).map(|c| c[1].to_string()),
    service: extract_service(line),
    message: None,
  };

  fields.message =
    extract_message(line).or_else(|| message_remainder(line, ts_text.as_deref(), &fields));
  fields
}

/// Returns the timestamp value plus the text it was read from.
fn extract_timestamp(line: &str) -> Option<(String, String)> {
  if let Some(m) = ISO_TS.find(line) {
    return Some((m.as_str().to_string(), m.as_str().to_string()));
  }
  if let Some(m) = SPACED_TS.find(line) {
    return Some((m.as_str().to_string(), m.as_str().to_string()));
  }
  let caps = EPOCH_TS.captures(line)?;
  let secs: i64 = caps[1].parse().ok()?;
  let dt = DateTime::from_timestamp(secs, 0)?;
  Some((format_instant(&dt), caps[0].to_string()))
}

fn extract_service(line: &str) -> Option<String> {
  let caps = SERVICE.captures(line)?;
  caps
    .get(1)
    .or_else(|| caps.get(2))
    .or_else(|| caps.get(3))
    .map(|m| m.as_str().to_string())
}

fn extract_message(line: &str) -> Option<String> {
  [&*MESSAGE_KV, &*MSG_KV, &*MESSAGE_JSON_FRAGMENT, &*MESSAGE_TOKEN]
    .iter()
    .find_map(|re| re.captures(line).map(|c| c[1].to_string()))
}

/// Whatever is left once the recognized timestamp, level, and service are cut out.
fn message_remainder(line: &str, ts_text: Option<&str>, fields: &RawFields) -> Option<String> {
  let mut rest = line.to_string();

  if let Some(ts) = ts_text {
    rest = rest.replacen(ts, "", 1);
  }
  if fields.level.is_some() {
    rest = LEVEL.replace(&rest, "").into_owned();
  }
  if let Some(svc) = &fields.service {
    rest = rest.replacen(svc.as_str(), "", 1).replace(['[', ']'], "");
  }

  let cleaned = rest
    .trim()
    .trim_start_matches(|c: char| c == '-' || c == ':' || c.is_whitespace())
    .trim();
  if cleaned.is_empty() {
    None
  } else {
    Some(cleaned.to_string())
  }
}
