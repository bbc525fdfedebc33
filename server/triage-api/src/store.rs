//! In-memory incident store with a retention cap.

use std::collections::VecDeque;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use triage_engine::AnalysisResult;
use uuid::Uuid;

use crate::types::StoredIncident;

pub const DEFAULT_MAX_INCIDENTS: usize = 1000;

/// Oldest incidents are evicted once more than `max_incidents` are held.
#[derive(Debug)]
pub struct IncidentStore {
  incidents: RwLock<VecDeque<StoredIncident>>,
  max_incidents: usize,
}

impl Default for IncidentStore {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_INCIDENTS)
  }
}

impl IncidentStore {
  pub fn new(max_incidents: usize) -> Self {
    Self {
      incidents: RwLock::new(VecDeque::new()),
      max_incidents: max_incidents.max(1),
    }
  }

  pub fn max_incidents(&self) -> usize {
    self.max_incidents
  }

  /// Assign an id and creation time, keep the verdict and its final
  /// explanation, return the stored copy.
  pub async fn insert(&self, result: &AnalysisResult) -> StoredIncident {
    let incident = StoredIncident {
      id: Uuid::new_v4(),
      incident_type: result.incident_type,
      severity: result.severity,
      risk_score: result.risk_score,
      signals: result.signals.clone(),
      explanation: result.explanation.clone(),
      created_at: Utc::now(),
    };

    let mut incidents = self.incidents.write().await;
    incidents.push_back(incident.clone());
    while incidents.len() > self.max_incidents {
      if let Some(evicted) = incidents.pop_front() {
        debug!(id = %evicted.id, "evicted oldest incident");
      }
    }
    incident
  }

  /// Newest first.
  pub async fn list(&self) -> Vec<StoredIncident> {
    self.incidents.read().await.iter().rev().cloned().collect()
  }

  pub async fn get(&self, id: Uuid) -> Option<StoredIncident> {
    self
      .incidents
      .read()
      .await
      .iter()
      .find(|i| i.id == id)
      .cloned()
  }

  pub async fn len(&self) -> usize {
    self.incidents.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.len().await == 0
  }
}
