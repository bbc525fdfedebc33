//! Boundary validation: turn a JSON request into a batch of raw lines.
//!
//! This is the only place malformed top-level input is rejected; once a
//! batch exists the pipeline cannot fail.

use serde_json::Value;

use crate::error::EngineError;

/// Request body accepted by the CLI (`--json`) and the HTTP layer:
/// `{"logs": [..]}` or a bare array. Every element must be a string.
pub fn parse_batch(value: &Value) -> Result<Vec<String>, EngineError> {
  let logs = match value {
    Value::Object(obj) => obj
      .get("logs")
      .ok_or_else(|| EngineError::validation("logs", "must be present"))?,
    Value::Array(_) => value,
    _ => {
      return Err(EngineError::validation(
        "logs",
        "body must be an object with 'logs' or an array of strings",
      ))
    }
  };

  let items = logs
    .as_array()
    .ok_or_else(|| EngineError::validation("logs", "must be an array of strings"))?;

  items
    .iter()
    .enumerate()
    .map(|(i, item)| match item {
      Value::String(s) => Ok(s.clone()),
      _ => Err(EngineError::validation(&format!("logs[{}]", i), "expected string")),
    })
    .collect()
}

/// Parse raw request text, then validate it.
pub fn parse_batch_str(body: &str) -> Result<Vec<String>, EngineError> {
  let value: Value = serde_json::from_str(body)?;
  parse_batch(&value)
}
