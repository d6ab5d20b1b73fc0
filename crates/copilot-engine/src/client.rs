use std::time::Duration;

use copilot_core::config::{Config, EngineEndpoint};
use copilot_core::deadline::Deadline;
use copilot_core::error::{CoreError, CoreResult};
use copilot_core::model::Workflow;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::rate_limit::RateLimiter;
use crate::retry::{with_retry, BackoffPolicy};
use crate::types::{CredentialSummary, Execution, Headers, HealthStatus, ListFilters, Page};

const API_KEY_HEADER: &str = "X-API-Key";
const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

/// Stateless (besides the rate limiter and an optional session token)
/// typed wrapper over the Engine's HTTP API (spec §4.1).
///
/// Every call routes through [`RateLimiter`] for its logical endpoint
/// and through [`with_retry`] for retryable (429/5xx/network) failures.
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: RateLimiter,
    retry_policy: BackoffPolicy,
    session_token: RwLock<Option<String>>,
}

impl EngineClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.engine_base_url.trim_end_matches('/').to_string(),
            api_key: config.engine_api_key.clone(),
            rate_limiter: RateLimiter::new(config.rate_limits.clone()),
            retry_policy: BackoffPolicy::default(),
            session_token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request<T, B>(
        &self,
        endpoint: EngineEndpoint,
        method: Method,
        path: &str,
        body: Option<&B>,
        deadline: Deadline,
    ) -> CoreResult<T>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.rate_limiter.acquire(endpoint).await;
        let session_token = self.session_token.read().await.clone();

        with_retry(self.retry_policy, || {
            let method = method.clone();
            let path = path.to_string();
            let session_token = session_token.clone();
            async move {
                let mut request = self.http.request(method, self.url(&path)).header(API_KEY_HEADER, &self.api_key);
                if let Some(token) = &session_token {
                    request = request.header(SESSION_TOKEN_HEADER, token);
                }
                if let Some(body) = body {
                    request = request.json(body);
                }

                let response = deadline
                    .run(request.send())
                    .await?
                    .map_err(CoreError::from)?;

                classify_and_parse(response).await
            }
        })
        .await
    }

    /// Tries the primary health endpoint first, falling back to a
    /// bounded `listWorkflows` call (spec §4.1).
    pub async fn health(&self, deadline: Deadline) -> CoreResult<HealthStatus> {
        match self.request::<HealthStatus, ()>(EngineEndpoint::ReadWorkflow, Method::GET, "/health", None, deadline).await {
            Ok(status) => Ok(status),
            Err(first_error) => {
                debug!(error = %first_error, "primary health endpoint failed, falling back to listWorkflows");
                let filters = ListFilters { limit: Some(1), ..Default::default() };
                self.list_workflows(filters, deadline).await.map(|_| HealthStatus { ok: true, version: None })
            }
        }
    }

    pub async fn create_workflow(&self, doc: &Workflow, deadline: Deadline) -> CoreResult<Workflow> {
        self.request(EngineEndpoint::WriteWorkflow, Method::POST, "/workflows", Some(doc), deadline).await
    }

    pub async fn get_workflow(&self, id: &str, deadline: Deadline) -> CoreResult<Workflow> {
        self.request::<Workflow, ()>(EngineEndpoint::ReadWorkflow, Method::GET, &format!("/workflows/{id}"), None, deadline).await
    }

    /// Attempts replacement semantics (`PUT`) first; on 405 retries once
    /// with a merge-style `PATCH` (spec §4.1, Open Question in spec §9).
    pub async fn update_workflow(&self, id: &str, doc: &Workflow, deadline: Deadline) -> CoreResult<Workflow> {
        let path = format!("/workflows/{id}");
        match self.request(EngineEndpoint::WriteWorkflow, Method::PUT, &path, Some(doc), deadline).await {
            Err(CoreError::ValidationBadRequest { status, .. }) if status == 405 => {
                self.request(EngineEndpoint::WriteWorkflow, Method::PATCH, &path, Some(doc), deadline).await
            }
            other => other,
        }
    }

    pub async fn delete_workflow(&self, id: &str, deadline: Deadline) -> CoreResult<()> {
        self.request::<serde_json::Value, ()>(EngineEndpoint::DeleteWorkflow, Method::DELETE, &format!("/workflows/{id}"), None, deadline)
            .await
            .map(|_| ())
    }

    pub async fn list_workflows(&self, filters: ListFilters, deadline: Deadline) -> CoreResult<Page<Workflow>> {
        let path = format!("/workflows{}", query_string(&filters));
        self.request::<Page<Workflow>, ()>(EngineEndpoint::ReadWorkflow, Method::GET, &path, None, deadline).await
    }

    pub async fn set_active(&self, id: &str, active: bool, deadline: Deadline) -> CoreResult<()> {
        #[derive(Serialize)]
        struct ActivePatch {
            active: bool,
        }
        self.request::<serde_json::Value, _>(
            EngineEndpoint::WriteWorkflow,
            Method::PATCH,
            &format!("/workflows/{id}"),
            Some(&ActivePatch { active }),
            deadline,
        )
        .await
        .map(|_| ())
    }

    pub async fn run(&self, id: &str, data: Option<serde_json::Value>, deadline: Deadline) -> CoreResult<Execution> {
        self.request(EngineEndpoint::CreateExecution, Method::POST, &format!("/workflows/{id}/run"), data.as_ref(), deadline).await
    }

    /// Uses a relaxed timeout since webhook targets are third-party
    /// endpoints, not the Engine itself (spec §4.1).
    pub async fn trigger_webhook(
        &self,
        url: &str,
        method: Method,
        data: Option<serde_json::Value>,
        headers: Headers,
        deadline: Deadline,
    ) -> CoreResult<serde_json::Value> {
        let mut request = self.http.request(method, url);
        for (key, value) in headers {
            request = request.header(key, value);
        }
        if let Some(data) = &data {
            request = request.json(data);
        }
        let relaxed = deadline.child(Duration::from_secs(120));
        let response = relaxed.run(request.send()).await?.map_err(CoreError::from)?;
        classify_and_parse(response).await
    }

    pub async fn get_execution(&self, id: &str, include_data: bool, deadline: Deadline) -> CoreResult<Execution> {
        let path = format!("/executions/{id}?includeData={include_data}");
        self.request::<Execution, ()>(EngineEndpoint::ReadExecution, Method::GET, &path, None, deadline).await
    }

    pub async fn list_executions(&self, filters: ListFilters, deadline: Deadline) -> CoreResult<Page<Execution>> {
        let path = format!("/executions{}", query_string(&filters));
        self.request::<Page<Execution>, ()>(EngineEndpoint::ReadExecution, Method::GET, &path, None, deadline).await
    }

    pub async fn stop_execution(&self, id: &str, deadline: Deadline) -> CoreResult<()> {
        self.request::<serde_json::Value, ()>(EngineEndpoint::ReadExecution, Method::POST, &format!("/executions/{id}/stop"), None, deadline)
            .await
            .map(|_| ())
    }

    pub async fn list_credentials(&self, filters: ListFilters, deadline: Deadline) -> CoreResult<Page<CredentialSummary>> {
        let path = format!("/credentials{}", query_string(&filters));
        self.request::<Page<CredentialSummary>, ()>(EngineEndpoint::ReadWorkflow, Method::GET, &path, None, deadline).await
    }

    pub async fn get_credential(&self, id: &str, deadline: Deadline) -> CoreResult<CredentialSummary> {
        self.request::<CredentialSummary, ()>(EngineEndpoint::ReadWorkflow, Method::GET, &format!("/credentials/{id}"), None, deadline).await
    }

    /// Session-authenticated introspection, source 1 of the catalog
    /// acquisition ladder (spec §4.2). Requires a prior
    /// [`EngineClient::authenticate_session`] call.
    pub async fn fetch_node_types_session(&self, deadline: Deadline) -> CoreResult<serde_json::Value> {
        if self.session_token.read().await.is_none() {
            return Err(CoreError::SessionAuth { message: "no active session".into() });
        }
        self.request::<serde_json::Value, ()>(EngineEndpoint::ReadWorkflow, Method::GET, "/rest/node-types", None, deadline).await
    }

    /// API-key introspection, source 2 of the ladder.
    pub async fn fetch_node_types_api_key(&self, deadline: Deadline) -> CoreResult<serde_json::Value> {
        self.request::<serde_json::Value, ()>(EngineEndpoint::ReadWorkflow, Method::GET, "/types/nodes.json", None, deadline).await
    }

    /// Alternate shape of the same data, source 3 of the ladder.
    pub async fn fetch_node_types_alternate(&self, deadline: Deadline) -> CoreResult<serde_json::Value> {
        self.request::<serde_json::Value, ()>(EngineEndpoint::ReadWorkflow, Method::GET, "/rest/node-types", None, deadline).await
    }

    /// Credential-type catalog. Failure here is non-fatal to the caller
    /// (spec §4.2: "leaves credential-type checks as soft warnings").
    pub async fn fetch_credential_types(&self, deadline: Deadline) -> CoreResult<serde_json::Value> {
        self.request::<serde_json::Value, ()>(EngineEndpoint::ReadWorkflow, Method::GET, "/types/credentials.json", None, deadline).await
    }

    /// Authenticate with session credentials, storing the returned
    /// token for subsequent `fetch_node_types_session` calls.
    pub async fn authenticate_session(&self, username: &str, password: &str, deadline: Deadline) -> CoreResult<()> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            username: &'a str,
            password: &'a str,
        }
        #[derive(serde::Deserialize)]
        struct LoginResponse {
            token: String,
        }

        let response: LoginResponse = self
            .request(
                EngineEndpoint::ReadWorkflow,
                Method::POST,
                "/rest/login",
                Some(&LoginRequest { username, password }),
                deadline,
            )
            .await
            .map_err(|error| match error {
                CoreError::Unauthenticated { message } => CoreError::SessionAuth { message },
                other => other,
            })?;

        *self.session_token.write().await = Some(response.token);
        Ok(())
    }
}

fn query_string(filters: &ListFilters) -> String {
    let mut parts = Vec::new();
    if let Some(active) = filters.active {
        parts.push(format!("active={active}"));
    }
    if let Some(workflow_id) = &filters.workflow_id {
        parts.push(format!("workflowId={workflow_id}"));
    }
    if let Some(limit) = filters.limit {
        parts.push(format!("limit={limit}"));
    }
    if let Some(cursor) = &filters.cursor {
        parts.push(format!("cursor={cursor}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

async fn classify_and_parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> CoreResult<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(CoreError::from);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs);

    let body_message = response.text().await.unwrap_or_default();

    Err(match status {
        StatusCode::UNAUTHORIZED => CoreError::Unauthenticated { message: body_message },
        StatusCode::NOT_FOUND => CoreError::NotFound { message: body_message },
        StatusCode::TOO_MANY_REQUESTS => CoreError::RateLimited { retry_after },
        status if status.is_client_error() => CoreError::ValidationBadRequest { message: body_message, status: status.as_u16() },
        status if status.is_server_error() => CoreError::ServerError { message: body_message, status: status.as_u16() },
        _ => {
            warn!(%status, "unclassified Engine response status");
            CoreError::Unknown { message: body_message }
        }
    })
}
