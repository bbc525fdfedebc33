//! Binary entrypoint: read one batch of raw log lines from stdin, write one
//! AnalysisResult as JSON to stdout.
//!
//! Input is either plain text (one log line per line, blank lines skipped) or,
//! with `--json`, a request body `{"logs": [..]}` / a bare array of strings.
//! A malformed JSON body produces an ErrorOutput and exit status 1.

use std::io::{self, BufRead, Read, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use triage_engine::types::ErrorOutput;
use triage_engine::{batch, Config, Engine, EngineError};

#[derive(Debug, Parser)]
#[command(name = "triage-engine", about = "Turn raw log lines into an incident assessment")]
struct Cli {
  /// Read a JSON request body instead of plain lines.
  #[arg(long)]
  json: bool,

  /// Pretty-print the output.
  #[arg(long)]
  pretty: bool,

  /// Error spike window, in records.
  #[arg(long, default_value_t = Config::default().spike_window)]
  spike_window: usize,
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_target(false)
    .compact()
    .try_init();
}

fn read_lines(input: impl BufRead) -> io::Result<Vec<String>> {
  let mut lines = Vec::new();
  for line in input.lines() {
    let line = line?;
    if !line.trim().is_empty() {
      lines.push(line);
    }
  }
  Ok(lines)
}

fn error_output(e: &EngineError) -> ErrorOutput {
  match e {
    EngineError::Validation { field, reason } => {
      ErrorOutput::new(reason.clone()).with_field(field.clone())
    }
    _ => ErrorOutput::new(e.to_string()),
  }
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> io::Result<()> {
  if pretty {
    serde_json::to_writer_pretty(&mut *out, value)?;
  } else {
    serde_json::to_writer(&mut *out, value)?;
  }
  writeln!(out)?;
  out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  init_tracing();
  let cli = Cli::parse();

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  let lines = if cli.json {
    let mut body = String::new();
    stdin.lock().read_to_string(&mut body)?;
    match batch::parse_batch_str(&body) {
      Ok(lines) => lines,
      Err(e) => {
        tracing::warn!(error = %e, "rejected request body");
        write_json(&mut out, &error_output(&e), cli.pretty)?;
        std::process::exit(1);
      }
    }
  } else {
    read_lines(stdin.lock())?
  };

  let engine = Engine::new(Config {
    spike_window: cli.spike_window,
    ..Config::default()
  });
  let result = engine.analyze(&lines);
  write_json(&mut out, &result, cli.pretty)?;
  Ok(())
}
