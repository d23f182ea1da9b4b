//! Error types for the review workflow.
//!
//! Validation errors are produced locally and never reach the backend.
//! Request failures come back from the transport collaborator and leave
//! local state untouched.

use crate::core::transaction::{TransactionId, TransactionStatus};
use crate::core::user::Role;
use thiserror::Error;

/// A client-side precondition that failed before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a rejection reason is required")]
    ReasonRequired,

    #[error("select at least one transaction to submit")]
    EmptySelection,

    #[error("only verified transactions can be submitted; {ineligible} selected transaction(s) are pending or rejected")]
    MixedStatus { ineligible: usize },

    #[error("cannot move transaction {id} from {from} to {to}")]
    IllegalTransition {
        id: TransactionId,
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("transaction {0} has an action in flight")]
    ActionInFlight(TransactionId),

    #[error("a batch submission is already in flight")]
    BatchInFlight,
}

/// Failure reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("transaction {0} not found")]
    NotFound(TransactionId),

    #[error("request rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
}

impl BackendError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }
}

/// Top-level error returned by every workflow entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request failed: {}", .message.as_deref().unwrap_or("please try again"))]
    RequestFailed { message: Option<String> },

    #[error("transaction {0} not found")]
    NotFound(TransactionId),

    #[error("no user is signed in")]
    Unauthenticated,

    #[error("role {role} may not review transactions")]
    Forbidden { role: Role },
}

impl ReviewError {
    /// Stable code for the presentation layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(v) => match v {
                ValidationError::ReasonRequired => "REASON_REQUIRED",
                ValidationError::EmptySelection => "EMPTY_SELECTION",
                ValidationError::MixedStatus { .. } => "MIXED_STATUS",
                ValidationError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
                ValidationError::ActionInFlight(_) => "ACTION_IN_FLIGHT",
                ValidationError::BatchInFlight => "BATCH_IN_FLIGHT",
            },
            Self::RequestFailed { .. } => "REQUEST_FAILED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden { .. } => "FORBIDDEN",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<BackendError> for ReviewError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(id) => Self::NotFound(id),
            BackendError::Rejected { message } => Self::RequestFailed { message },
        }
    }
}
