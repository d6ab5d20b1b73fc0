//! End-to-end Coordinator scenarios against a mocked Engine.

use std::sync::Arc;
use std::time::Duration;

use copilot_api::{envelope, Coordinator, CoordinatorError};
use copilot_catalog::NodeCatalog;
use copilot_core::config::{Config, PolicyConfig};
use copilot_core::memory::SharedMemory;
use copilot_engine::EngineClient;
use copilot_gateway::Gateway;
use copilot_router::{ExecutionOutcome, Path, RouteInput, Router};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: String) -> Config {
    Config {
        engine_base_url: base_url,
        engine_api_key: "key".into(),
        session_credentials: None,
        dry_run_enabled: false,
        semantic_check_enabled: false,
        strict_mode: false,
        validation_deadline: Duration::from_secs(10),
        catalog_refresh_interval: Duration::from_secs(300),
        catalog_fetch_deadline: Duration::from_secs(5),
        policy: PolicyConfig::default(),
        rate_limits: Default::default(),
        router_min_history_size: 5,
        router_metric_retention: Duration::from_secs(60 * 60 * 24 * 30),
        validation_cache_ttl: Duration::from_secs(60),
    }
}

fn base_workflow() -> serde_json::Value {
    json!({
        "name": "demo workflow",
        "nodes": [
            {"name": "start", "type": "pkg-base.webhook", "type_version": 1, "position": [0.0, 0.0]},
            {"name": "transform", "type": "pkg-base.function", "type_version": 1, "position": [200.0, 0.0]},
        ],
        "connections": {
            "start": {"main": [[{"node": "transform"}]]}
        },
    })
}

async fn seed_catalog_mocks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/types/nodes.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"identifier": "pkg-base.webhook", "display_name": "Webhook", "versions": [1], "group_tags": ["trigger"]},
            {"identifier": "pkg-base.function", "display_name": "Function", "versions": [1]},
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/types/credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

async fn coordinator(server: &MockServer) -> Coordinator {
    seed_catalog_mocks(server).await;
    let cfg = config(server.uri());
    let engine = Arc::new(EngineClient::new(&cfg));
    let catalog = Arc::new(NodeCatalog::new(engine.clone(), &cfg));
    catalog.refresh().await.expect("seed refresh must succeed");
    let memory = SharedMemory::new();
    let gateway = Arc::new(Gateway::new(&cfg, catalog.clone(), engine.clone(), memory.clone(), None));
    let router = Arc::new(Router::new(memory.clone(), cfg.router_min_history_size, cfg.router_metric_retention));
    Coordinator::new(cfg, engine, catalog, gateway, router, memory)
}

#[tokio::test]
async fn submit_for_validation_only_never_touches_the_engine_workflows_endpoint() {
    let server = MockServer::start().await;
    // Deliberately no mock for POST /workflows: if validation-only ever
    // called it, wiremock would panic on the unexpected request.
    let coord = coordinator(&server).await;

    let result = coord.submit_for_validation(&base_workflow()).await.unwrap();
    assert!(result.valid);
}

#[tokio::test]
async fn submit_with_deploy_rejects_before_touching_the_engine_on_invalid_input() {
    let server = MockServer::start().await;
    let coord = coordinator(&server).await;

    let mut doc = base_workflow();
    doc["nodes"][1]["type"] = json!("pkg-base.does-not-exist");

    let err = coord.submit_with_deploy(&doc).await.unwrap_err();
    match err {
        CoordinatorError::ValidationFailed(result) => assert!(!result.valid),
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_with_deploy_creates_the_workflow_on_the_engine_when_valid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/workflows"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "wf-1",
            "name": "demo workflow",
            "nodes": base_workflow()["nodes"],
            "connections": base_workflow()["connections"],
        })))
        .mount(&server)
        .await;
    let coord = coordinator(&server).await;

    let submission = coord.submit_with_deploy(&base_workflow()).await.expect("deploy must succeed");
    assert!(submission.validation.valid);
    assert_eq!(submission.workflow.id.as_deref(), Some("wf-1"));
}

#[tokio::test]
async fn get_workflow_surfaces_not_found_as_a_core_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/workflows/missing")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
    let coord = coordinator(&server).await;

    let err = coord.get_workflow("missing").await.unwrap_err();
    let json = envelope(&Result::<(), _>::Err(err));
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["kind"], "NotFound");
}

#[tokio::test]
async fn resync_invalidates_the_validation_cache_and_refreshes_the_catalog() {
    let server = MockServer::start().await;
    let coord = coordinator(&server).await;

    let doc = base_workflow();
    let first = coord.submit_for_validation(&doc).await.unwrap();
    assert!(!first.cached);
    let second = coord.submit_for_validation(&doc).await.unwrap();
    assert!(second.cached);

    let stats = coord.resync_catalog().await.expect("resync must succeed");
    assert_eq!(stats.total_nodes, 2);

    let third = coord.submit_for_validation(&doc).await.unwrap();
    assert!(!third.cached, "resync must have purged the cached outcome");
}

#[tokio::test]
async fn router_statistics_reflect_recorded_outcomes() {
    let server = MockServer::start().await;
    let coord = coordinator(&server).await;

    coord.record_execution_outcome(ExecutionOutcome { path: Path::Agent, success: true, latency_ms: 50, recorded_at: chrono::Utc::now() }).await;
    coord.record_execution_outcome(ExecutionOutcome { path: Path::Handler, success: false, latency_ms: 20, recorded_at: chrono::Utc::now() }).await;

    let stats = coord.router_statistics().await;
    assert_eq!(stats.total_executions, 2);

    let decision = coord.route(RouteInput { goal: Some("send a reminder".into()), workflow: None, force: None }).await;
    assert_eq!(decision.path, Path::Agent);
    assert_eq!(decision.confidence, 1.0);
}
