//! ACP wire format against an in-process axum server.

#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use acp_conductor::acp::{
    AcpHttpEndpoint, AgentDescriptor, AgentEndpoint, AgentInvoker, AgentRegistry, RetryPolicy,
};
use acp_conductor::core::StepOutcome;
use acp_conductor::error::{StepFailure, TransportError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

type Captured = Arc<Mutex<Vec<Value>>>;

async fn list_agents() -> Json<Value> {
    Json(json!({
        "agents": [
            {"name": "rag_agent", "description": "Insurance policy questions", "metadata": {}},
            {"name": "health_agent", "description": null}
        ]
    }))
}

async fn create_run(State(captured): State<Captured>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if let Ok(mut c) = captured.lock() {
        c.push(body.clone());
    }
    let question = body["input"][0]["parts"][0]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    match body["agent_name"].as_str() {
        Some("rag_agent") => (
            StatusCode::OK,
            Json(json!({
                "run_id": "r1",
                "status": "completed",
                "output": [
                    {"role": "agent/rag_agent", "parts": [
                        {"content": format!("Answer to: {question}"), "content_type": "text/plain"},
                        {"content": "Source: policy.pdf", "content_type": "text/plain"}
                    ]}
                ]
            })),
        ),
        Some("broken_agent") => (
            StatusCode::OK,
            Json(json!({
                "status": "failed",
                "output": [],
                "error": {"code": "server_error", "message": "model crashed"}
            })),
        ),
        Some("busy_agent") => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"detail": "busy"}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "agent not found"}))),
    }
}

async fn spawn_server() -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/agents", get(list_agents))
        .route("/runs", post(create_run))
        .with_state(Arc::clone(&captured));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("bind failed: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("no local addr: {e}"));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/"), captured)
}

#[tokio::test]
async fn discovery_reads_agent_listing() {
    let (url, _) = spawn_server().await;
    let endpoint = AcpHttpEndpoint::new(url);

    let agents = endpoint
        .list_agents()
        .await
        .unwrap_or_else(|e| panic!("listing failed: {e}"));

    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].name, "rag_agent");
    assert_eq!(agents[0].description, "Insurance policy questions");
    assert_eq!(agents[1].description, "");
}

#[tokio::test]
async fn run_sends_sync_text_message_and_joins_parts() {
    let (url, captured) = spawn_server().await;
    let endpoint = AcpHttpEndpoint::new(url);

    let answer = endpoint
        .run("rag_agent", "What is the waiting period?")
        .await
        .unwrap_or_else(|e| panic!("run failed: {e}"));

    assert_eq!(
        answer,
        "Answer to: What is the waiting period?\nSource: policy.pdf"
    );
    let bodies = captured.lock().map(|c| c.clone()).unwrap_or_default();
    assert_eq!(
        bodies[0],
        json!({
            "agent_name": "rag_agent",
            "input": [{
                "role": "user",
                "parts": [{"content": "What is the waiting period?", "content_type": "text/plain"}]
            }],
            "mode": "sync"
        })
    );
}

#[tokio::test]
async fn failed_run_carries_agent_error() {
    let (url, _) = spawn_server().await;
    let endpoint = AcpHttpEndpoint::new(url);

    match endpoint.run("broken_agent", "q").await {
        Err(TransportError::RunFailed { status, message }) => {
            assert_eq!(status, "failed");
            assert_eq!(message, "server_error: model crashed");
        }
        other => panic!("expected RunFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn http_status_errors_are_classified() {
    let (url, _) = spawn_server().await;
    let endpoint = AcpHttpEndpoint::new(url);

    let busy = endpoint.run("busy_agent", "q").await.err();
    assert!(matches!(busy, Some(TransportError::Status { status: 503, .. })));
    assert!(busy.is_some_and(|e| e.is_retryable()));

    let missing = endpoint.run("nobody", "q").await.err();
    assert!(matches!(missing, Some(TransportError::Status { status: 404, .. })));
}

#[tokio::test]
async fn registry_and_invoker_over_http() {
    let (url, _) = spawn_server().await;
    let endpoints: Vec<Arc<dyn AgentEndpoint>> = vec![
        Arc::new(AcpHttpEndpoint::new(url)),
        Arc::new(AcpHttpEndpoint::new("http://127.0.0.1:9")),
    ];

    let discovery = AgentRegistry::new(Duration::from_secs(2))
        .discover_detailed(&endpoints)
        .await;
    assert_eq!(discovery.agents.len(), 2);
    assert!(discovery.endpoints[0].error.is_none());
    assert!(discovery.endpoints[1].error.is_some());

    let invoker = AgentInvoker::new(
        Duration::from_secs(2),
        RetryPolicy::new(2, Duration::from_millis(1)),
    );
    let rag: &AgentDescriptor = &discovery.agents[0];
    let outcome = invoker.invoke(rag, "cover?").await;
    assert!(outcome.is_success());

    let broken = AgentDescriptor::new("broken_agent", "", Arc::clone(&rag.endpoint));
    assert!(matches!(
        invoker.invoke(&broken, "q").await,
        StepOutcome::Failure(StepFailure::Communication { .. })
    ));
}
