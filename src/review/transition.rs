//! Per-transaction status transitions.
//!
//! Validation here is purely local: it decides whether an approve or
//! reject intent may be sent to the backend at all. Applying the result
//! to the store happens once the backend has confirmed it.

use crate::core::transaction::{TransactionId, TransactionStatus};
use crate::error::{ReviewError, ValidationError};
use log::debug;
use std::collections::HashSet;
use std::fmt;

/// An employee's decision on a single pending transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// Approve, with an optional note for the audit trail.
    Approve { note: Option<String> },
    /// Reject. The reason is mandatory.
    Reject { reason: String },
}

impl ReviewAction {
    pub fn approve() -> Self {
        Self::Approve { note: None }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }

    /// Status the transaction ends up in if the backend accepts.
    pub fn target_status(&self) -> TransactionStatus {
        match self {
            Self::Approve { .. } => TransactionStatus::Verified,
            Self::Reject { .. } => TransactionStatus::Rejected,
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve { .. } => write!(f, "approve"),
            Self::Reject { .. } => write!(f, "reject"),
        }
    }
}

/// What became of an approve/reject intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The backend accepted and the store now shows the new status.
    Applied(TransactionStatus),
    /// Another action for the same id was still outstanding. Nothing was sent.
    Ignored,
    /// The backend accepted, but the view was closed before the response
    /// arrived, so local state was left alone.
    Discarded,
}

/// Stateless checks for the review state machine.
pub struct TransitionController;

impl TransitionController {
    /// Validate `action` against the current status of `id`.
    ///
    /// # Returns
    /// * `Ok(target)` if the intent may be sent to the backend
    /// * `Err(ValidationError::ReasonRequired)` for a blank rejection reason
    /// * `Err(ReviewError::NotFound)` if `id` is not in the store
    /// * `Err(ValidationError::IllegalTransition)` unless the transaction is pending
    pub fn validate(
        id: &TransactionId,
        current: Option<TransactionStatus>,
        action: &ReviewAction,
    ) -> Result<TransactionStatus, ReviewError> {
        if let ReviewAction::Reject { reason } = action {
            if reason.trim().is_empty() {
                return Err(ValidationError::ReasonRequired.into());
            }
        }
        let from = current.ok_or_else(|| ReviewError::NotFound(id.clone()))?;
        let to = action.target_status();
        if !from.can_transition_to(to) {
            return Err(ValidationError::IllegalTransition {
                id: id.clone(),
                from,
                to,
            }
            .into());
        }
        Ok(to)
    }

    /// Validate a batch settlement transition for one transaction.
    pub fn validate_settlement(
        id: &TransactionId,
        current: Option<TransactionStatus>,
    ) -> Result<(), ReviewError> {
        let from = current.ok_or_else(|| ReviewError::NotFound(id.clone()))?;
        if from.can_transition_to(TransactionStatus::Submitted) {
            Ok(())
        } else {
            Err(ValidationError::IllegalTransition {
                id: id.clone(),
                from,
                to: TransactionStatus::Submitted,
            }
            .into())
        }
    }
}

/// Identifiers with a request outstanding.
///
/// An id is locked from the moment its intent is accepted until the
/// backend answers, whatever the answer.
#[derive(Debug, Clone, Default)]
pub struct ActionLocks {
    locked: HashSet<TransactionId>,
}

impl ActionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `id`. Returns false if it was already locked.
    pub fn try_lock(&mut self, id: &TransactionId) -> bool {
        let acquired = self.locked.insert(id.clone());
        if acquired {
            debug!("locks: {} locked", id);
        }
        acquired
    }

    pub fn release(&mut self, id: &TransactionId) {
        if self.locked.remove(id) {
            debug!("locks: {} released", id);
        }
    }

    pub fn is_locked(&self, id: &TransactionId) -> bool {
        self.locked.contains(id)
    }

    pub fn any_locked<'a>(&self, mut ids: impl Iterator<Item = &'a TransactionId>) -> Option<TransactionId> {
        ids.find(|id| self.locked.contains(*id)).cloned()
    }

    pub fn len(&self) -> usize {
        self.locked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked.is_empty()
    }
}
