//! Batch signals: per-event-type frequencies and error-spike clustering.

use crate::types::{LogLevel, LogRecord, SignalVector};

/// Count error spikes by index proximity.
///
/// A new spike starts at an ERROR record when no ERROR has been seen yet or
/// the previous ERROR is more than `window` records back. Every ERROR moves
/// the anchor, so a run of near ERRORs counts once.
pub fn count_error_spikes(records: &[LogRecord], window: usize) -> u64 {
  let mut spikes = 0;
  let mut last_error: Option<usize> = None;

  for (i, record) in records.iter().enumerate() {
    if record.level != LogLevel::Error {
      continue;
    }
    let starts_spike = match last_error {
      Some(prev) => i - prev > window,
      None => true,
    };
    if starts_spike {
      spikes += 1;
    }
    last_error = Some(i);
  }

  spikes
}

/// Aggregate a batch into its signal vector.
pub fn extract_signals(records: &[LogRecord], window: usize) -> SignalVector {
  let mut signals = SignalVector::zeroed();
  for record in records {
    *signals
      .event_type_frequencies
      .entry(record.event_type)
      .or_insert(0) += 1;
  }
  signals.error_spike_count = count_error_spikes(records, window);
  signals
}
