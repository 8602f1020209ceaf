//! Failure taxonomy surfaced by every registry operation.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use landreg_auth::AuthzError;
use landreg_core::DomainError;

use crate::ledger::{LedgerError, Revert};

/// Registry operation error.
///
/// - **Local**: `Validation`, `Unauthorized`. Caught before any ledger call.
/// - **Ledger-enforced**: `NotOwner`, `NotForSale`, `AlreadySold`,
///   `InvalidState`, `NotFound`, `LedgerRejected`. Never retried.
/// - **Transient**: `LedgerUnavailable`, `LedgerTimeout`. The caller may retry
///   with backoff after re-querying state; a timeout says nothing about
///   whether the transaction committed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("caller does not own the parcel")]
    NotOwner,

    #[error("parcel is not listed for sale")]
    NotForSale,

    #[error("parcel has already been sold")]
    AlreadySold,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected by ledger: {0}")]
    LedgerRejected(String),

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("ledger call exceeded its deadline of {0:?}")]
    LedgerTimeout(Duration),

    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),
}

/// Classification handed to the boundary layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Unauthorized,
    NotOwner,
    NotForSale,
    AlreadySold,
    InvalidState,
    NotFound,
    LedgerRejected,
    LedgerUnavailable,
    LedgerTimeout,
    MalformedResponse,
}

impl FailureKind {
    /// Conventional HTTP status for this failure.
    pub fn status_code(self) -> u16 {
        match self {
            FailureKind::Validation => 400,
            FailureKind::Unauthorized | FailureKind::NotOwner => 403,
            FailureKind::NotFound => 404,
            FailureKind::NotForSale | FailureKind::AlreadySold | FailureKind::InvalidState => 409,
            FailureKind::LedgerRejected => 422,
            FailureKind::MalformedResponse => 502,
            FailureKind::LedgerUnavailable => 503,
            FailureKind::LedgerTimeout => 504,
        }
    }
}

impl WorkflowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WorkflowError::Validation(_) => FailureKind::Validation,
            WorkflowError::Unauthorized(_) => FailureKind::Unauthorized,
            WorkflowError::NotOwner => FailureKind::NotOwner,
            WorkflowError::NotForSale => FailureKind::NotForSale,
            WorkflowError::AlreadySold => FailureKind::AlreadySold,
            WorkflowError::InvalidState(_) => FailureKind::InvalidState,
            WorkflowError::NotFound(_) => FailureKind::NotFound,
            WorkflowError::LedgerRejected(_) => FailureKind::LedgerRejected,
            WorkflowError::LedgerUnavailable(_) => FailureKind::LedgerUnavailable,
            WorkflowError::LedgerTimeout(_) => FailureKind::LedgerTimeout,
            WorkflowError::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }

    /// Infrastructure failures only. Business-rule failures would fail again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WorkflowError::LedgerUnavailable(_) | WorkflowError::LedgerTimeout(_)
        )
    }

    /// Map a failed read. Reads never carry business rules, so a revert means
    /// the ledger could not serve the query.
    pub fn from_query(err: LedgerError) -> Self {
        match err {
            LedgerError::Unavailable(msg) => WorkflowError::LedgerUnavailable(msg),
            LedgerError::Reverted(revert) => {
                WorkflowError::LedgerUnavailable(format!("query reverted: {revert}"))
            }
            LedgerError::Malformed(msg) => WorkflowError::MalformedResponse(msg),
        }
    }
}

impl From<Revert> for WorkflowError {
    fn from(value: Revert) -> Self {
        match value {
            Revert::NotOwner => WorkflowError::NotOwner,
            Revert::NotForSale => WorkflowError::NotForSale,
            Revert::AlreadySold => WorkflowError::AlreadySold,
            Revert::InvalidState(msg) => WorkflowError::InvalidState(msg),
            Revert::NotFound => WorkflowError::NotFound("no such ledger record".to_string()),
            Revert::Unauthorized => {
                WorkflowError::Unauthorized("ledger refused the signer".to_string())
            }
            Revert::Other(msg) => WorkflowError::LedgerRejected(msg),
        }
    }
}

impl From<LedgerError> for WorkflowError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::Unavailable(msg) => WorkflowError::LedgerUnavailable(msg),
            LedgerError::Reverted(revert) => revert.into(),
            LedgerError::Malformed(msg) => WorkflowError::MalformedResponse(msg),
        }
    }
}

impl From<DomainError> for WorkflowError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                WorkflowError::Validation(msg)
            }
            DomainError::InvalidTransition(msg) => WorkflowError::InvalidState(msg),
        }
    }
}

impl From<AuthzError> for WorkflowError {
    fn from(value: AuthzError) -> Self {
        WorkflowError::Unauthorized(value.to_string())
    }
}
