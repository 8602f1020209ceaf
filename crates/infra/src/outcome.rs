//! Result object handed to the transport boundary.

use serde::Serialize;

use crate::error::{FailureKind, WorkflowError};
use crate::normalize::Normalized;

/// `{ success, data?, message?, failure?, warnings? }`
///
/// `failure` carries the classification the boundary maps to a transport
/// status; `warnings` lists every value that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> OperationResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            failure: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn failed(err: &WorkflowError) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(err.to_string()),
            failure: Some(err.kind()),
            warnings: Vec::new(),
        }
    }

    /// Status the boundary should answer with (200 on success).
    pub fn status_code(&self) -> u16 {
        self.failure.map(FailureKind::status_code).unwrap_or(200)
    }
}

impl<T> From<Result<T, WorkflowError>> for OperationResult<T> {
    fn from(value: Result<T, WorkflowError>) -> Self {
        match value {
            Ok(data) => OperationResult::ok(data),
            Err(err) => OperationResult::failed(&err),
        }
    }
}

impl<T> OperationResult<T> {
    /// Like `From<Result<T, _>>`, also carrying normalization warnings.
    pub fn from_normalized(value: Result<Normalized<T>, WorkflowError>) -> Self {
        match value {
            Ok(normalized) => {
                let warnings = normalized.warnings.iter().map(ToString::to_string).collect();
                OperationResult {
                    warnings,
                    ..OperationResult::ok(normalized.value)
                }
            }
            Err(err) => OperationResult::failed(&err),
        }
    }
}
