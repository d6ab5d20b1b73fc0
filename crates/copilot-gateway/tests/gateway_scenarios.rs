//! End-to-end Validation Gateway scenarios against a mocked Engine.

use std::sync::Arc;
use std::time::Duration;

use copilot_catalog::NodeCatalog;
use copilot_core::config::{Config, PolicyConfig};
use copilot_core::error::{ErrorCode, Layer};
use copilot_core::memory::SharedMemory;
use copilot_engine::EngineClient;
use copilot_gateway::Gateway;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: String, policy: PolicyConfig, dry_run_enabled: bool, strict_mode: bool) -> Config {
    Config {
        engine_base_url: base_url,
        engine_api_key: "key".into(),
        session_credentials: None,
        dry_run_enabled,
        semantic_check_enabled: false,
        strict_mode,
        validation_deadline: Duration::from_secs(10),
        catalog_refresh_interval: Duration::from_secs(300),
        catalog_fetch_deadline: Duration::from_secs(5),
        policy,
        rate_limits: Default::default(),
        router_min_history_size: 5,
        router_metric_retention: Duration::from_secs(1),
        validation_cache_ttl: Duration::from_secs(60),
    }
}

async fn seeded_catalog(server: &MockServer, cfg: &Config) -> Arc<NodeCatalog> {
    Mock::given(method("GET"))
        .and(path("/types/nodes.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"identifier": "pkg-base.webhook", "display_name": "Webhook", "versions": [1], "group_tags": ["trigger"]},
            {"identifier": "pkg-base.httpRequest", "display_name": "HTTP Request", "versions": [1], "required_credentials": ["httpBasicAuth"]},
            {"identifier": "pkg-base.function", "display_name": "Function", "versions": [1]},
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/types/credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"identifier": "httpBasicAuth", "display_name": "HTTP Basic Auth"},
        ])))
        .mount(server)
        .await;

    let catalog = Arc::new(NodeCatalog::new(Arc::new(EngineClient::new(cfg)), cfg));
    catalog.refresh().await.expect("seed refresh must succeed");
    catalog
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

async fn gateway(server: &MockServer, dry_run_enabled: bool, strict_mode: bool) -> Gateway {
    let cfg = config(server.uri(), PolicyConfig::default(), dry_run_enabled, strict_mode);
    let catalog = seeded_catalog(server, &cfg).await;
    let engine = Arc::new(EngineClient::new(&cfg));
    Gateway::new(&cfg, catalog, engine, SharedMemory::new(), None)
}

#[tokio::test]
async fn missing_node_type_reports_node_not_found_with_suggestions() {
    let server = MockServer::start().await;
    let gw = gateway(&server, false, false).await;

    let mut doc = base_workflow();
    doc["nodes"][1]["type"] = json!("pkg-base.functon");

    let result = gw.validate(&doc).await;
    assert!(!result.valid);
    assert_eq!(result.failed_layer, Some(Layer::NodeExistence));
    let error = &result.errors[0];
    assert_eq!(error.code, ErrorCode::NodeNotFound);
    assert!(error.suggestions.len() <= 3);
    assert!(error.suggestions.iter().any(|s| s == "pkg-base.function"));
}

#[tokio::test]
async fn disallowed_community_node_is_rejected_at_layer_zero_with_static_alternatives() {
    let server = MockServer::start().await;
    let gw = gateway(&server, false, false).await;

    let mut doc = base_workflow();
    doc["nodes"][1]["type"] = json!("community-pkg.fancy");

    let result = gw.validate(&doc).await;
    assert!(!result.valid);
    assert_eq!(result.failed_layer, Some(Layer::NodeRestrictions));
    assert_eq!(result.errors[0].code, ErrorCode::NodeNotAllowed);
    assert!(!result.errors[0].suggestions.is_empty());
}

#[tokio::test]
async fn dangling_connection_reports_exact_path() {
    let server = MockServer::start().await;
    let gw = gateway(&server, false, false).await;

    let mut doc = base_workflow();
    doc["connections"]["start"]["main"] = json!([[{"node": "missing"}]]);

    let result = gw.validate(&doc).await;
    assert!(!result.valid);
    assert_eq!(result.failed_layer, Some(Layer::Connections));
    assert_eq!(result.errors[0].code, ErrorCode::ConnectionTargetMissing);
    assert_eq!(result.errors[0].path.as_deref(), Some("connections.start.main[0]"));
}

#[tokio::test]
async fn orphan_node_passes_with_a_warning() {
    let server = MockServer::start().await;
    let gw = gateway(&server, false, false).await;

    let mut doc = base_workflow();
    doc["nodes"].as_array_mut().unwrap().push(json!({"name": "stray", "type": "pkg-base.function", "type_version": 1, "position": [400.0, 0.0]}));

    let result = gw.validate(&doc).await;
    assert!(result.valid);
    assert!(result.warnings.iter().any(|w| w.code == ErrorCode::OrphanNode && w.path.as_deref() == Some("nodes.stray")));
}

#[tokio::test]
async fn dry_run_rejection_surfaces_engine_message_and_leaves_nothing_behind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/workflows"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "node 'transform' rejected by engine"})))
        .mount(&server)
        .await;

    let gw = gateway(&server, true, false).await;
    let result = gw.validate(&base_workflow()).await;

    assert!(!result.valid);
    assert_eq!(result.failed_layer, Some(Layer::DryRun));
    assert_eq!(result.errors[0].code, ErrorCode::N8nRejected);
    assert!(result.errors[0].message.contains("rejected by engine"));
    assert_eq!(result.dry_run_id, None);
}

#[tokio::test]
async fn catalog_unavailable_degrades_node_existence_to_a_warning() {
    let server = MockServer::start().await;
    // No /types/nodes.json mock is mounted, and the fallback workflow-scan
    // page comes back empty, so the catalog ends up with no node types at all.
    Mock::given(method("GET")).and(path("/types/nodes.json")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
    Mock::given(method("GET")).and(path("/rest/node-types")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
    Mock::given(method("GET")).and(path("/workflows")).respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "next_cursor": null}))).mount(&server).await;
    Mock::given(method("GET")).and(path("/types/credentials.json")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let cfg = config(server.uri(), PolicyConfig::default(), false, false);
    let catalog = Arc::new(NodeCatalog::new(Arc::new(EngineClient::new(&cfg)), &cfg));
    catalog.refresh().await.expect("refresh still succeeds via the empty workflow-scan fallback");
    assert!(catalog.statistics().await.total_nodes == 0);

    let engine = Arc::new(EngineClient::new(&cfg));
    let gw = Gateway::new(&cfg, catalog, engine, SharedMemory::new(), None);

    let result = gw.validate(&base_workflow()).await;
    assert!(result.valid);
    assert!(result.warnings.iter().any(|w| w.code == ErrorCode::CatalogNotReady));
}

#[tokio::test]
async fn identical_documents_hit_the_cache_on_the_second_call() {
    let server = MockServer::start().await;
    let gw = gateway(&server, false, false).await;

    let doc = base_workflow();
    let first = gw.validate(&doc).await;
    let second = gw.validate(&doc).await;

    assert!(first.valid && second.valid);
    assert!(!first.cached);
    assert!(second.cached);
}

#[tokio::test]
async fn strict_mode_turns_warnings_into_a_failed_validation() {
    let server = MockServer::start().await;
    let gw = gateway(&server, false, true).await;

    let mut doc = base_workflow();
    doc["nodes"].as_array_mut().unwrap().push(json!({"name": "stray", "type": "pkg-base.function", "type_version": 1, "position": [400.0, 0.0]}));

    let result = gw.validate(&doc).await;
    assert!(!result.valid);
    assert_eq!(result.failed_layer, None);
    assert!(result.warnings.iter().any(|w| w.code == ErrorCode::OrphanNode));
}
