//! Binary entrypoint for the triage API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use triage_engine::Engine;

use triage_api::explain::DEFAULT_OLLAMA_MODEL;
use triage_api::store::DEFAULT_MAX_INCIDENTS;
use triage_api::{AppState, OllamaConfig, OllamaExplainer};

#[derive(Debug, Parser)]
#[command(name = "triage-api", about = "HTTP front end for the log triage engine")]
struct ServerConfig {
  /// Address to listen on.
  #[arg(long, env = "TRIAGE_BIND", default_value = "127.0.0.1:5005")]
  bind: SocketAddr,

  /// Ollama base URL. Unset keeps the rule-based explanation.
  #[arg(long, env = "OLLAMA_URL")]
  ollama_url: Option<String>,

  #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_OLLAMA_MODEL)]
  ollama_model: String,

  /// Deadline for one generated explanation.
  #[arg(long, env = "EXPLAIN_TIMEOUT_SECS", default_value_t = 30)]
  explain_timeout_secs: u64,

  /// Incidents kept in memory; the oldest are dropped past this.
  #[arg(long, env = "TRIAGE_MAX_INCIDENTS", default_value_t = DEFAULT_MAX_INCIDENTS)]
  max_incidents: usize,

  /// Emit logs as JSON lines.
  #[arg(long)]
  log_json: bool,
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false);
  let _ = if json {
    builder.json().try_init()
  } else {
    builder.compact().try_init()
  };
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let config = ServerConfig::parse();
  init_tracing(config.log_json);

  let timeout = Duration::from_secs(config.explain_timeout_secs);
  let mut state =
    AppState::new(Engine::with_defaults()).with_max_incidents(config.max_incidents);
  if let Some(base_url) = &config.ollama_url {
    let explainer = OllamaExplainer::new(OllamaConfig {
      base_url: base_url.clone(),
      model: config.ollama_model.clone(),
      timeout,
    })?;
    info!(url = %base_url, model = %config.ollama_model, "explanations enabled");
    state = state.with_explainer(Arc::new(explainer), timeout);
  }

  let app = triage_api::router(Arc::new(state));

  info!(addr = %config.bind, "triage-api listening");
  let listener = tokio::net::TcpListener::bind(config.bind).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
