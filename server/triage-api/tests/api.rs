//! Router-level tests for the triage API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
  body::{to_bytes, Body},
  http::{header, Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use triage_api::{router, AppState, ExplainError, Explainer};
use triage_engine::{Engine, ExplanationContext, EXPLANATION_UNAVAILABLE};

struct FixedExplainer(&'static str);

#[async_trait]
impl Explainer for FixedExplainer {
  async fn generate(&self, ctx: &ExplanationContext) -> Result<String, ExplainError> {
    Ok(format!("{} ({})", self.0, ctx.incident_type))
  }
}

struct FailingExplainer;

#[async_trait]
impl Explainer for FailingExplainer {
  async fn generate(&self, _ctx: &ExplanationContext) -> Result<String, ExplainError> {
    Err(ExplainError::Status(503))
  }
}

fn app_with(state: AppState) -> (Router, Arc<AppState>) {
  let state = Arc::new(state);
  (router(state.clone()), state)
}

fn plain_app() -> (Router, Arc<AppState>) {
  app_with(AppState::new(Engine::with_defaults()))
}

fn post_analyze(body: Value) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri("/analyze")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn scenario() -> Value {
  json!({
    "logs": [
      "2024-01-15T10:30:00Z ERROR [api] Connection refused",
      "2024-01-15T10:30:01Z ERROR [auth] Invalid token provided",
      "2024-01-15T10:30:02Z WARN [api] Rate limit approaching"
    ]
  })
}

#[tokio::test]
async fn health_is_ok() {
  let (app, _) = plain_app();
  let response = app.oneshot(get("/health")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn analyze_returns_verdict_and_stores_it() {
  let (app, state) = plain_app();
  let response = app.oneshot(post_analyze(scenario())).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let body = json_body(response).await;
  assert_eq!(body["incidentType"], "AUTHENTICATION_BREACH");
  assert_eq!(body["riskScore"], 30);
  assert_eq!(body["severity"], "MEDIUM");
  assert_eq!(body["normalizedLogs"].as_array().unwrap().len(), 3);
  assert_eq!(body["signals"][0], json!({"type": "ErrorSpike", "count": 1}));
  assert!(body["explanation"]
    .as_str()
    .unwrap()
    .starts_with("Incident: AUTHENTICATION_BREACH."));
  assert!(body["createdAt"].is_string());

  let id: uuid::Uuid = serde_json::from_value(body["incidentId"].clone()).unwrap();
  let stored = state.store.get(id).await.unwrap();
  assert_eq!(stored.risk_score, 30);
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
  for body in [json!({"lines": []}), json!({"logs": "x"}), json!({"logs": [1, 2]}), json!(42)] {
    let (app, state) = plain_app();
    let response = app.oneshot(post_analyze(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("'logs'"));
    assert!(state.store.is_empty().await);
  }
}

#[tokio::test]
async fn invalid_json_is_rejected() {
  let (app, _) = plain_app();
  let request = Request::builder()
    .method("POST")
    .uri("/analyze")
    .body(Body::from("{not json"))
    .unwrap();
  let response = app.oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_analyze_is_method_not_allowed() {
  let (app, _) = plain_app();
  let response = app.oneshot(get("/analyze")).await.unwrap();
  assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
  assert_eq!(response.headers()[header::ALLOW], "POST");
}

#[tokio::test]
async fn incidents_listed_newest_first() {
  let (app, _) = plain_app();
  let first = json_body(app.clone().oneshot(post_analyze(json!(["INFO [a] one"]))).await.unwrap()).await;
  let second = json_body(app.clone().oneshot(post_analyze(scenario())).await.unwrap()).await;

  let list = json_body(app.clone().oneshot(get("/incidents")).await.unwrap()).await;
  let list = list.as_array().unwrap();
  assert_eq!(list.len(), 2);
  assert_eq!(list[0]["id"], second["incidentId"]);
  assert_eq!(list[1]["id"], first["incidentId"]);
  assert!(list[0].get("normalizedLogs").is_none());

  let uri = format!("/incidents/{}", first["incidentId"].as_str().unwrap());
  let one = app.oneshot(get(&uri)).await.unwrap();
  assert_eq!(one.status(), StatusCode::OK);
  assert_eq!(json_body(one).await["incidentType"], first["incidentType"]);
}

#[tokio::test]
async fn unknown_incident_is_404() {
  let (app, _) = plain_app();
  let uri = format!("/incidents/{}", uuid::Uuid::new_v4());
  let response = app.oneshot(get(&uri)).await.unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
  assert!(json_body(response).await["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn explainer_text_replaces_rule_summary() {
  let state = AppState::new(Engine::with_defaults())
    .with_explainer(Arc::new(FixedExplainer("## Summary")), Duration::from_secs(5));
  let (app, _) = app_with(state);
  let body = json_body(app.oneshot(post_analyze(scenario())).await.unwrap()).await;
  assert_eq!(body["explanation"], "## Summary (AUTHENTICATION_BREACH)");
  assert_eq!(body["riskScore"], 30);
}

#[tokio::test]
async fn explainer_failure_degrades_to_placeholder() {
  let state = AppState::new(Engine::with_defaults())
    .with_explainer(Arc::new(FailingExplainer), Duration::from_secs(5));
  let (app, state) = app_with(state);
  let response = app.oneshot(post_analyze(scenario())).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let body = json_body(response).await;
  assert_eq!(body["explanation"], EXPLANATION_UNAVAILABLE);
  assert_eq!(body["incidentType"], "AUTHENTICATION_BREACH");
  assert_eq!(state.store.list().await[0].explanation, EXPLANATION_UNAVAILABLE);
}

#[tokio::test]
async fn stored_incidents_are_capped_and_flattened() {
  let (app, state) = app_with(AppState::new(Engine::with_defaults()).with_max_incidents(1));
  let first = json_body(app.clone().oneshot(post_analyze(json!(["INFO [a] one"]))).await.unwrap()).await;
  let second = json_body(app.clone().oneshot(post_analyze(scenario())).await.unwrap()).await;
  assert_eq!(state.store.len().await, 1);

  let uri = format!("/incidents/{}", first["incidentId"].as_str().unwrap());
  assert_eq!(app.clone().oneshot(get(&uri)).await.unwrap().status(), StatusCode::NOT_FOUND);

  let list = json_body(app.oneshot(get("/incidents")).await.unwrap()).await;
  assert_eq!(list[0]["id"], second["incidentId"]);
  assert_eq!(list[0]["signals"], second["signals"]);

  // The store itself keeps the zero-filled vector.
  let stored = &state.store.list().await[0];
  assert_eq!(stored.signals.event_type_frequencies.len(), 7);
}
