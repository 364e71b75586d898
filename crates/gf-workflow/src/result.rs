// result.rs — The uniform operation envelope.
//
// Every public workflow operation returns this shape, so callers handle
// the happy/error split without type-specific matching.

use serde::Serialize;

use crate::error::WorkflowError;

/// Outcome envelope: `{success, message, data?, error?}`.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WorkflowError>,
}

impl<T> ActionResult<T> {
    /// Successful outcome with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Successful outcome that produced nothing (e.g., an expected no-op).
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Failed outcome; the message mirrors the error's display form.
    pub fn err(error: WorkflowError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            data: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_has_data_and_no_error() {
        let result = ActionResult::ok("done", 42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn err_envelope_mirrors_error_message() {
        let result: ActionResult<()> =
            ActionResult::err(WorkflowError::NotFound("g-abc123".to_string()));
        assert!(!result.success);
        assert!(result.message.contains("g-abc123"));
        assert!(matches!(result.error, Some(WorkflowError::NotFound(_))));
    }

    #[test]
    fn envelope_serializes_without_empty_fields() {
        let result: ActionResult<()> = ActionResult::ok_empty("nothing to do");
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("\"data\""));
        assert!(!json.contains("\"error\""));
    }
}
