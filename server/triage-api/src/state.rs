//! Shared handler state.

use std::sync::Arc;
use std::time::Duration;

use triage_engine::Engine;

use crate::explain::Explainer;
use crate::store::IncidentStore;

pub struct AppState {
  pub engine: Engine,
  pub store: IncidentStore,
  /// `None` keeps the rule-based explanation.
  pub explainer: Option<Arc<dyn Explainer>>,
  pub explain_timeout: Duration,
}

impl AppState {
  pub fn new(engine: Engine) -> Self {
    Self {
      engine,
      store: IncidentStore::default(),
      explainer: None,
      explain_timeout: Duration::from_secs(30),
    }
  }

  /// Keep at most `max_incidents` incidents, evicting the oldest.
  pub fn with_max_incidents(mut self, max_incidents: usize) -> Self {
    self.store = IncidentStore::new(max_incidents);
    self
  }

  pub fn with_explainer(mut self, explainer: Arc<dyn Explainer>, timeout: Duration) -> Self {
    self.explainer = Some(explainer);
    self.explain_timeout = timeout;
    self
  }
}
