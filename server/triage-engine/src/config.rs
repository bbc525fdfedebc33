//! Engine configuration with sane defaults.

/// Tunables for one analysis run.
#[derive(Debug, Clone)]
pub struct Config {
  /// Max index gap between ERROR records that still belong to the same spike.
  pub spike_window: usize,
  /// Normalized records handed to an explanation generator.
  pub explanation_sample_size: usize,
  /// Batches at least this long are normalized on the rayon pool.
  pub parallel_min_batch: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      spike_window: 5,
      explanation_sample_size: 5,
      parallel_min_batch: 256,
    }
  }
}
