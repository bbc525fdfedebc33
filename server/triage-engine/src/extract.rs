//! Fill missing candidate fields with fixed defaults.

use crate::standardize::now_iso;
use crate::types::{ExtractedFields, RawFields};

pub const DEFAULT_LEVEL: &str = "INFO";
pub const DEFAULT_SERVICE: &str = "unknown";
pub const DEFAULT_MESSAGE: &str = "(no message)";

/// Trim every field; absent or blank ones get their default. A missing
/// timestamp reads the wall clock.
pub fn extract_fields(raw: &RawFields) -> ExtractedFields {
  ExtractedFields {
    timestamp: present(&raw.timestamp).unwrap_or_else(now_iso),
    level: present(&raw.level).unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
    service: present(&raw.service).unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
    message: present(&raw.message).unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
  }
}

fn present(value: &Option<String>) -> Option<String> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}
