//! `{success, ...}` envelope handed to the presentation layer.

use crate::error::{Result, TabulaError};
use serde::Serialize;

/// Serializable failure details.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub kind: &'static str,
    pub message: String,
}

impl From<&TabulaError> for ErrorPayload {
    fn from(err: &TabulaError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": {"kind": ..., "message": ...}}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OperationResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl<T> OperationResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(err: &TabulaError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.into()),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failed(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let result: OperationResult<u32> = Ok(3).into();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": true, "data": 3})
        );
    }

    #[test]
    fn test_failure_shape() {
        let result: OperationResult<u32> =
            Err(TabulaError::invalid_state("tab 't1' is not removed")).into();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": false,
                "error": {"kind": "invalid_state", "message": "Invalid state: tab 't1' is not removed"}
            })
        );
    }
}
