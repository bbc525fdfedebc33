//! Generated incident write-ups from a local Ollama model.
//!
//! The explainer is optional: when it fails, times out, or is not configured
//! the analysis still goes out, with the placeholder (or rule-based) text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use triage_engine::ExplanationContext;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

pub const SYSTEM_PROMPT: &str = "You are an incident response analyst. Given structured incident \
data (type, severity, risk score, signals, log excerpts), produce a concise professional analysis \
in Markdown.

Include:
1. **Summary** - One-line incident summary
2. **Root Cause** - Likely cause based on signals and event types
3. **Impact** - Potential impact given severity
4. **Recommendations** - 2-3 actionable next steps

Be concise. Use bullet points where appropriate. Return only Markdown, no preamble.";

#[derive(Debug, Error)]
pub enum ExplainError {
  #[error("http: {0}")]
  Http(#[from] reqwest::Error),

  #[error("model returned status {0}")]
  Status(u16),

  #[error("model returned an empty response")]
  Empty,

  #[error("no response within {0:?}")]
  Timeout(Duration),
}

/// Turns an incident context into prose.
#[async_trait]
pub trait Explainer: Send + Sync {
  async fn generate(&self, ctx: &ExplanationContext) -> Result<String, ExplainError>;
}

/// Run `explainer` under a deadline.
pub async fn generate_with_timeout(
  explainer: &dyn Explainer,
  ctx: &ExplanationContext,
  timeout: Duration,
) -> Result<String, ExplainError> {
  match tokio::time::timeout(timeout, explainer.generate(ctx)).await {
    Ok(outcome) => outcome,
    Err(_) => Err(ExplainError::Timeout(timeout)),
  }
}

/// User half of the prompt: the verdict, the frequencies, and the sampled lines.
pub fn build_prompt(ctx: &ExplanationContext) -> String {
  let frequencies =
    serde_json::to_string_pretty(&ctx.signals.event_type_frequencies).unwrap_or_default();
  let samples = if ctx.sample_logs.is_empty() {
    "(none)".to_string()
  } else {
    ctx
      .sample_logs
      .iter()
      .map(|l| format!("- [{}] {}: {}", l.level, l.service, l.message))
      .collect::<Vec<_>>()
      .join("\n")
  };

  format!(
    "Analyze this incident:\n\n\
     Type: {}\n\
     Severity: {}\n\
     Risk Score: {}/100\n\
     Error Spike Count: {}\n\n\
     Event Type Frequencies:\n{}\n\n\
     Sample Logs:\n{}\n",
    ctx.incident_type,
    ctx.severity,
    ctx.risk_score,
    ctx.signals.error_spike_count,
    frequencies,
    samples,
  )
}

#[derive(Debug, Clone)]
pub struct OllamaConfig {
  pub base_url: String,
  pub model: String,
  /// Transport-level timeout for one request.
  pub timeout: Duration,
}

impl Default for OllamaConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_OLLAMA_URL.to_string(),
      model: DEFAULT_OLLAMA_MODEL.to_string(),
      timeout: Duration::from_secs(30),
    }
  }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
  model: &'a str,
  prompt: String,
  system: &'a str,
  stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  response: String,
}

pub struct OllamaExplainer {
  client: Client,
  config: OllamaConfig,
}

impl OllamaExplainer {
  pub fn new(config: OllamaConfig) -> Result<Self, ExplainError> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &OllamaConfig {
    &self.config
  }

  fn generate_url(&self) -> String {
    format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
  }
}

#[async_trait]
impl Explainer for OllamaExplainer {
  async fn generate(&self, ctx: &ExplanationContext) -> Result<String, ExplainError> {
    let request = GenerateRequest {
      model: &self.config.model,
      prompt: build_prompt(ctx),
      system: SYSTEM_PROMPT,
      stream: false,
    };
    debug!(model = %self.config.model, url = %self.generate_url(), "requesting explanation");

    let response = self
      .client
      .post(self.generate_url())
      .json(&request)
      .send()
      .await?;
    if !response.status().is_success() {
      return Err(ExplainError::Status(response.status().as_u16()));
    }

    let body: GenerateResponse = response.json().await?;
    let text = body.response.trim();
    if text.is_empty() {
      return Err(ExplainError::Empty);
    }
    Ok(text.to_string())
  }
}
