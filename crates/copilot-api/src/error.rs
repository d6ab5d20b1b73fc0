//! Coordinator-level error and the `{ok, value}` / `{ok:false, error,
//! validation?}` response envelope (spec §6, §7).

use copilot_core::error::CoreError;
use copilot_gateway::GatewayResult;
use serde::Serialize;

/// Everything a Coordinator operation can fail with: either a
/// transport/core fault, or a validation rejection carrying the full
/// Validation Gateway result that produced it.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("workflow failed validation")]
    ValidationFailed(Box<GatewayResult>),
}

impl CoordinatorError {
    pub fn validation_failed(result: GatewayResult) -> Self {
        Self::ValidationFailed(Box::new(result))
    }
}

/// Machine-readable error body, spec §7's `{kind, message, retryable,
/// recoverySteps[], details?}`. Validation failures have no `ErrorShape`
/// of their own — their detail lives in the sibling `validation` field.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorShape {
    pub kind: String,
    pub message: String,
    pub retryable: bool,
    #[serde(rename = "recoverySteps")]
    pub recovery_steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&CoreError> for ErrorShape {
    fn from(error: &CoreError) -> Self {
        Self {
            kind: format!("{:?}", error.kind()),
            message: error.to_string(),
            retryable: error.retryable(),
            recovery_steps: error.recovery_steps().0,
            details: None,
        }
    }
}

/// Renders a Coordinator result into spec §6/§7's response shape:
/// `{ok:true, value}` on success, `{ok:false, error, validation?}` on
/// failure — `error` is a placeholder kind when the failure was a
/// validation rejection rather than a transport fault.
pub fn envelope<T: Serialize>(result: &Result<T, CoordinatorError>) -> serde_json::Value {
    match result {
        Ok(value) => serde_json::json!({ "ok": true, "value": value }),
        Err(CoordinatorError::Core(error)) => {
            serde_json::json!({ "ok": false, "error": ErrorShape::from(error) })
        }
        Err(CoordinatorError::ValidationFailed(validation)) => serde_json::json!({
            "ok": false,
            "error": ErrorShape {
                kind: "ValidationFailed".to_string(),
                message: "workflow failed validation".to_string(),
                retryable: false,
                recovery_steps: vec!["Inspect the validation errors and correct the workflow document".to_string()],
                details: None,
            },
            "validation": validation.as_ref(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::error::Layer;
    use copilot_gateway::{GatewayResult, ValidationError};
    use copilot_core::error::ErrorCode;

    #[test]
    fn success_envelope_is_ok_true_with_value() {
        let result: Result<u32, CoordinatorError> = Ok(7);
        let json = envelope(&result);
        assert_eq!(json["ok"], true);
        assert_eq!(json["value"], 7);
    }

    #[test]
    fn core_error_envelope_carries_retryable_and_recovery_steps() {
        let result: Result<u32, CoordinatorError> =
            Err(CoreError::ServerError { message: "boom".into(), status: 503 }.into());
        let json = envelope(&result);
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["retryable"], true);
        assert!(json["error"]["recoverySteps"].as_array().unwrap().len() > 0);
    }

    #[test]
    fn validation_failure_envelope_nests_the_gateway_result() {
        let gateway_result = GatewayResult {
            valid: false,
            errors: vec![ValidationError::new(Layer::NodeExistence, ErrorCode::NodeNotFound, "missing")],
            warnings: vec![],
            passed_layers: vec![],
            failed_layer: Some(Layer::NodeExistence),
            dry_run_id: None,
            elapsed_ms: 3,
            cached: false,
        };
        let result: Result<u32, CoordinatorError> = Err(CoordinatorError::validation_failed(gateway_result));
        let json = envelope(&result);
        assert_eq!(json["ok"], false);
        assert_eq!(json["validation"]["failedLayer"], "nodeExistence");
    }
}
