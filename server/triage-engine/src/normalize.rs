//! Per-line stages: parse, fill defaults, standardize, classify.

use rayon::prelude::*;
use tracing::debug;

use crate::classify::classify;
use crate::extract::extract_fields;
use crate::parser::parse_line;
use crate::standardize::standardize;
use crate::types::LogRecord;

/// Normalize one raw line into a classified record. Total for any input.
pub fn normalize_line(line: &str) -> LogRecord {
  let raw = parse_line(line);
  let extracted = extract_fields(&raw);
  let std = standardize(&extracted);
  let event_type = classify(&std.message);

  LogRecord {
    timestamp: std.timestamp,
    level: std.level,
    service: std.service,
    message: std.message,
    event_type,
  }
}

/// Normalize a batch, preserving input order. Batches of at least
/// `parallel_min_batch` lines are spread over the rayon pool.
pub fn normalize_batch<S>(lines: &[S], parallel_min_batch: usize) -> Vec<LogRecord>
where
  S: AsRef<str> + Sync,
{
  if lines.len() >= parallel_min_batch.max(1) {
    debug!(lines = lines.len(), "normalizing batch in parallel");
    lines.par_iter().map(|l| normalize_line(l.as_ref())).collect()
  } else {
    lines.iter().map(|l| normalize_line(l.as_ref())).collect()
  }
}
