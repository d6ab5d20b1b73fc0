//! Layer 6 — Live dry-run (optional) (spec §4.4).
//!
//! Never cached (spec §4.4 "Caching": "the Engine's view may have
//! changed"). Resource cleanup is best-effort on every exit path (spec
//! §5 "Resource cleanup").

use copilot_core::deadline::Deadline;
use copilot_core::error::{CoreError, ErrorCode, Layer};
use copilot_core::model::Workflow;
use copilot_engine::EngineClient;

use crate::result::{LayerOutcome, ValidationError, ValidationWarning};

pub struct DryRunOutcome {
    pub layer: LayerOutcome,
    pub dry_run_id: Option<String>,
}

pub async fn run(workflow: &Workflow, engine: &EngineClient, deadline: Deadline) -> DryRunOutcome {
    let mut layer = LayerOutcome::default();
    let candidate = clone_for_dry_run(workflow);

    let created = match engine.create_workflow(&candidate, deadline).await {
        Ok(created) => created,
        Err(error) => {
            layer.errors.push(dry_run_error(error));
            return DryRunOutcome { layer, dry_run_id: None };
        }
    };

    let dry_run_id = created.id.clone();

    if let Some(id) = &dry_run_id {
        if let Err(error) = engine.delete_workflow(id, deadline).await {
            layer.warnings.push(ValidationWarning::new(
                Layer::DryRun,
                ErrorCode::CleanupFailed,
                format!("failed to delete temporary dry-run workflow '{id}': {error}"),
            ));
        }
    }

    DryRunOutcome { layer, dry_run_id }
}

fn clone_for_dry_run(workflow: &Workflow) -> Workflow {
    let mut candidate = workflow.clone();
    candidate.id = None;
    candidate.name = format!("__copilot_dry_run__{}_{}", uuid::Uuid::new_v4(), chrono::Utc::now().timestamp());
    candidate.active = false;
    candidate
}

fn dry_run_error(error: CoreError) -> ValidationError {
    match error {
        CoreError::ValidationBadRequest { message, .. } | CoreError::ServerError { message, .. } => {
            ValidationError::new(Layer::DryRun, ErrorCode::N8nRejected, message)
        }
        other => ValidationError::new(Layer::DryRun, ErrorCode::DryRunError, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::config::Config;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> Config {
        Config {
            engine_base_url: base_url,
            engine_api_key: "key".into(),
            session_credentials: None,
            dry_run_enabled: true,
            semantic_check_enabled: false,
            strict_mode: false,
            validation_deadline: Duration::from_secs(5),
            catalog_refresh_interval: Duration::from_secs(300),
            catalog_fetch_deadline: Duration::from_secs(5),
            policy: Default::default(),
            rate_limits: Default::default(),
            router_min_history_size: 5,
            router_metric_retention: Duration::from_secs(1),
            validation_cache_ttl: Duration::from_secs(1),
        }
    }

    fn workflow() -> Workflow {
        Workflow {
            id: None,
            name: "wf".into(),
            nodes: vec![],
            connections: Default::default(),
            settings: None,
            tags: vec![],
            static_data: None,
            pinned_data: None,
            active: false,
        }
    }

    #[tokio::test]
    async fn successful_dry_run_deletes_the_temporary_workflow() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/workflows")).respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "dry-1", "name": "x", "nodes": [], "connections": {}, "active": false}))).expect(1).mount(&server).await;
        Mock::given(method("DELETE")).and(path("/workflows/dry-1")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&server).await;

        let engine = EngineClient::new(&config(server.uri()));
        let outcome = run(&workflow(), &engine, Deadline::after(Duration::from_secs(5))).await;

        assert!(outcome.layer.passed());
        assert_eq!(outcome.dry_run_id.as_deref(), Some("dry-1"));
    }

    #[tokio::test]
    async fn rejected_creation_surfaces_as_n8n_rejected_with_no_dry_run_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/workflows")).respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"message": "node X is unsupported"}))).expect(1).mount(&server).await;

        let engine = EngineClient::new(&config(server.uri()));
        let outcome = run(&workflow(), &engine, Deadline::after(Duration::from_secs(5))).await;

        assert!(!outcome.layer.passed());
        assert_eq!(outcome.dry_run_id, None);
        assert_eq!(outcome.layer.errors[0].code, ErrorCode::N8nRejected);
    }

    #[tokio::test]
    async fn failed_cleanup_is_a_warning_not_an_error() {
        let server = MockServer::start().await;
        // A 500 on delete is retryable (spec §5), so the client retries the
        // cleanup call several times before giving up and warning.
        Mock::given(method("POST")).and(path("/workflows")).respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "dry-2", "name": "x", "nodes": [], "connections": {}, "active": false}))).expect(1).mount(&server).await;
        Mock::given(method("DELETE")).and(path("/workflows/dry-2")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

        let engine = EngineClient::new(&config(server.uri()));
        let outcome = run(&workflow(), &engine, Deadline::after(Duration::from_secs(5))).await;

        assert!(outcome.layer.passed());
        assert_eq!(outcome.dry_run_id.as_deref(), Some("dry-2"));
        assert_eq!(outcome.layer.warnings[0].code, ErrorCode::CleanupFailed);
    }

    #[test]
    fn clone_for_dry_run_strips_identity_and_activity() {
        let mut source = workflow();
        source.id = Some("real-1".into());
        source.active = true;
        let candidate = clone_for_dry_run(&source);
        assert_eq!(candidate.id, None);
        assert!(!candidate.active);
        assert!(candidate.name.starts_with("__copilot_dry_run__"));
    }
}
