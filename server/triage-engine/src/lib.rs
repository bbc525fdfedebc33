//! Log Triage Engine: deterministic, rule-based log-to-incident pipeline.
//!
//! Parses heterogeneous raw log lines, standardizes and classifies each one,
//! extracts batch signals (event-type frequencies, error spikes), maps them to
//! an incident type through ordered rules, and scores the risk.
//!
//! No AI, no DB, no network; pure computation. The analysis is total over any
//! batch of strings.

pub mod batch;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod parser;
pub mod risk;
pub mod rules;
pub mod signals;
pub mod standardize;
pub mod types;

pub use batch::parse_batch;
pub use config::Config;
pub use engine::{analyze, Engine};
pub use error::EngineError;
pub use types::{
  AnalysisResult, EventType, ExplanationContext, IncidentType, LogLevel, LogRecord, Severity,
  SignalVector, EXPLANATION_UNAVAILABLE,
};
