//! Transport collaborator seam.
//!
//! The workflow talks to the payments backend only through
//! [`TransactionBackend`]. The wire format is somebody else's problem;
//! implementations map their failures onto [`BackendError`].

pub mod memory;

use crate::core::transaction::{Transaction, TransactionId};
use crate::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::InMemoryBackend;

/// Acknowledgement of a settled batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAck {
    pub submitted_count: usize,
}

#[async_trait]
pub trait TransactionBackend: Send + Sync {
    /// Fetch every transaction visible to the employee, in display order.
    async fn fetch_all_transactions(&self) -> Result<Vec<Transaction>, BackendError>;

    /// Fetch one transaction for the detail view.
    async fn fetch_transaction_by_id(&self, id: &TransactionId) -> Result<Transaction, BackendError>;

    /// Mark a pending transaction verified.
    async fn approve_transaction(&self, id: &TransactionId, note: &str) -> Result<(), BackendError>;

    /// Mark a pending transaction rejected. `reason` is never empty.
    async fn reject_transaction(&self, id: &TransactionId, reason: &str) -> Result<(), BackendError>;

    /// Hand verified transactions to the settlement network as one batch.
    async fn submit_batch(&self, ids: &[TransactionId]) -> Result<BatchAck, BackendError>;
}
