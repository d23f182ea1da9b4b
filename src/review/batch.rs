use crate::backend::TransactionBackend;
use crate::core::transaction::{Transaction, TransactionId, TransactionStatus};
use crate::error::{ReviewError, ValidationError};
use crate::review::selection::SelectionSet;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// A validated batch: the selected ids in store order, all verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    ids: Vec<TransactionId>,
}

impl BatchPlan {
    pub fn ids(&self) -> &[TransactionId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Result of a settled batch as reported to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReceipt {
    /// Count confirmed by the backend.
    pub submitted_count: usize,
    /// Ids that were sent, in order.
    pub ids: Vec<TransactionId>,
    /// Whether the follow-up refetch succeeded.
    pub refreshed: bool,
}

/// Validation and dispatch of grouped settlement submissions.
pub struct BatchSubmissionGate;

impl BatchSubmissionGate {
    /// Check a selection against the store.
    ///
    /// Fails with `EmptySelection` for an empty selection, then with
    /// `MixedStatus` if any selected transaction is not verified. A
    /// selected id missing from the store counts as ineligible.
    pub fn validate(
        selection: &SelectionSet,
        transactions: &[Transaction],
    ) -> Result<BatchPlan, ReviewError> {
        if selection.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }

        let selected: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| selection.contains(t.id()))
            .collect();
        let missing = selection.len().saturating_sub(selected.len());
        let ineligible = missing
            + selected
                .iter()
                .filter(|t| t.status() != TransactionStatus::Verified)
                .count();

        if ineligible > 0 {
            warn!(
                "batch: refusing selection of {} with {} ineligible transaction(s)",
                selection.len(),
                ineligible
            );
            return Err(ValidationError::MixedStatus { ineligible }.into());
        }

        Ok(BatchPlan {
            ids: selected.iter().map(|t| t.id().clone()).collect(),
        })
    }

    /// Send one batch RPC for a validated plan.
    ///
    /// An acknowledgement that does not cover every id in the plan is a
    /// failed batch: nothing is committed locally.
    pub async fn dispatch(
        backend: &dyn TransactionBackend,
        plan: &BatchPlan,
        network: &str,
    ) -> Result<usize, ReviewError> {
        match backend.submit_batch(plan.ids()).await {
            Ok(ack) if ack.submitted_count != plan.len() => {
                warn!(
                    "batch: {} acknowledged {} of {} transaction(s), treating as failed",
                    network,
                    ack.submitted_count,
                    plan.len()
                );
                Err(ReviewError::RequestFailed {
                    message: Some(format!(
                        "{} settled {} of {} transaction(s)",
                        network,
                        ack.submitted_count,
                        plan.len()
                    )),
                })
            }
            Ok(ack) => {
                info!(
                    "batch: {} transaction(s) submitted to {}",
                    ack.submitted_count, network
                );
                Ok(ack.submitted_count)
            }
            Err(err) => {
                warn!("batch: submission to {} failed: {}", network, err);
                Err(err.into())
            }
        }
    }
}
