use crate::backend::{BatchAck, TransactionBackend};
use crate::core::transaction::{Transaction, TransactionId, TransactionStatus};
use crate::error::BackendError;
use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;
use uuid::Uuid;

/// How many times each backend operation has been called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_all: usize,
    pub fetch_by_id: usize,
    pub approve: usize,
    pub reject: usize,
    pub submit_batch: usize,
}

impl CallCounts {
    /// Calls that would have changed server-side state.
    pub fn mutations(&self) -> usize {
        self.approve + self.reject + self.submit_batch
    }
}

#[derive(Debug, Default)]
struct Inner {
    transactions: Vec<Transaction>,
    fail_next: Option<BackendError>,
    calls: CallCounts,
    batches: Vec<Vec<TransactionId>>,
}

/// A backend that keeps its transactions in memory.
///
/// Enforces the server's own status rules, assigns a settlement
/// reference to every transaction in an accepted batch, and can be told
/// to fail the next call.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
}

impl InMemoryBackend {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                transactions,
                ..Default::default()
            }),
        }
    }

    /// Make the next call (of any kind) fail with `error`.
    pub async fn fail_next(&self, error: BackendError) {
        self.inner.lock().await.fail_next = Some(error);
    }

    pub async fn calls(&self) -> CallCounts {
        self.inner.lock().await.calls
    }

    /// Every accepted or attempted batch, in call order.
    pub async fn batches(&self) -> Vec<Vec<TransactionId>> {
        self.inner.lock().await.batches.clone()
    }

    /// The server's current view of the data.
    pub async fn snapshot(&self) -> Vec<Transaction> {
        self.inner.lock().await.transactions.clone()
    }

    /// Replace a record server-side, as another employee or process would.
    pub async fn upsert(&self, transaction: Transaction) {
        let mut inner = self.inner.lock().await;
        match inner
            .transactions
            .iter_mut()
            .find(|t| t.id() == transaction.id())
        {
            Some(existing) => *existing = transaction,
            None => inner.transactions.push(transaction),
        }
    }

    pub async fn remove(&self, id: &TransactionId) {
        self.inner.lock().await.transactions.retain(|t| t.id() != id);
    }
}

impl Inner {
    fn take_failure(&mut self) -> Result<(), BackendError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_mut(&mut self, id: &TransactionId) -> Result<&mut Transaction, BackendError> {
        self.transactions
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| BackendError::NotFound(id.clone()))
    }

    fn transition(
        &mut self,
        id: &TransactionId,
        to: TransactionStatus,
    ) -> Result<(), BackendError> {
        let tx = self.find_mut(id)?;
        if !tx.status().can_transition_to(to) {
            return Err(BackendError::rejected(format!(
                "transaction {} is {}, cannot become {}",
                id,
                tx.status(),
                to
            )));
        }
        tx.set_status(to);
        Ok(())
    }
}

#[async_trait]
impl TransactionBackend for InMemoryBackend {
    async fn fetch_all_transactions(&self) -> Result<Vec<Transaction>, BackendError> {
        let mut inner = self.inner.lock().await;
        inner.calls.fetch_all += 1;
        inner.take_failure()?;
        Ok(inner.transactions.clone())
    }

    async fn fetch_transaction_by_id(&self, id: &TransactionId) -> Result<Transaction, BackendError> {
        let mut inner = self.inner.lock().await;
        inner.calls.fetch_by_id += 1;
        inner.take_failure()?;
        inner.find_mut(id).map(|t| t.clone())
    }

    async fn approve_transaction(&self, id: &TransactionId, note: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().await;
        inner.calls.approve += 1;
        inner.take_failure()?;
        debug!("backend: approve {} (note: {:?})", id, note);
        inner.transition(id, TransactionStatus::Verified)
    }

    async fn reject_transaction(&self, id: &TransactionId, reason: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().await;
        inner.calls.reject += 1;
        inner.take_failure()?;
        if reason.trim().is_empty() {
            return Err(BackendError::rejected("rejection reason is required"));
        }
        debug!("backend: reject {} ({})", id, reason);
        inner.transition(id, TransactionStatus::Rejected)
    }

    async fn submit_batch(&self, ids: &[TransactionId]) -> Result<BatchAck, BackendError> {
        let mut inner = self.inner.lock().await;
        inner.calls.submit_batch += 1;
        inner.batches.push(ids.to_vec());
        inner.take_failure()?;

        // All or nothing: check every id before touching any of them.
        for id in ids {
            let tx = inner.find_mut(id)?;
            if tx.status() != TransactionStatus::Verified {
                return Err(BackendError::rejected(format!(
                    "transaction {} is {}, only verified transactions can be settled",
                    id,
                    tx.status()
                )));
            }
        }
        for id in ids {
            let tx = inner.find_mut(id)?;
            tx.set_status(TransactionStatus::Submitted);
            tx.set_settlement_reference(format!("STL-{}", Uuid::new_v4().simple()));
        }
        Ok(BatchAck {
            submitted_count: ids.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use rust_decimal_macros::dec;

    fn tx(id: &str, status: TransactionStatus) -> Transaction {
        Transaction::new(id, "B", "ACC", dec!(10), CurrencyCode::new("USD")).with_status(status)
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let backend = InMemoryBackend::new(vec![
            tx("1", TransactionStatus::Verified),
            tx("2", TransactionStatus::Pending),
        ]);
        let ids = vec![TransactionId::new("1"), TransactionId::new("2")];
        assert!(backend.submit_batch(&ids).await.is_err());

        let snapshot = backend.snapshot().await;
        assert_eq!(snapshot[0].status(), TransactionStatus::Verified);
        assert!(snapshot[0].settlement_reference().is_none());
    }

    #[tokio::test]
    async fn test_batch_assigns_settlement_reference() {
        let backend = InMemoryBackend::new(vec![tx("1", TransactionStatus::Verified)]);
        let ack = backend.submit_batch(&[TransactionId::new("1")]).await.unwrap();
        assert_eq!(ack.submitted_count, 1);

        let snapshot = backend.snapshot().await;
        assert_eq!(snapshot[0].status(), TransactionStatus::Submitted);
        assert!(snapshot[0].settlement_reference().unwrap().starts_with("STL-"));
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let backend = InMemoryBackend::new(vec![tx("1", TransactionStatus::Pending)]);
        backend.fail_next(BackendError::rejected("down")).await;
        assert!(backend.fetch_all_transactions().await.is_err());
        assert!(backend.fetch_all_transactions().await.is_ok());
        assert_eq!(backend.calls().await.fetch_all, 2);
    }

    #[tokio::test]
    async fn test_approve_twice_is_rejected_server_side() {
        let backend = InMemoryBackend::new(vec![tx("1", TransactionStatus::Pending)]);
        let id = TransactionId::new("1");
        backend.approve_transaction(&id, "").await.unwrap();
        assert!(matches!(
            backend.approve_transaction(&id, "").await,
            Err(BackendError::Rejected { .. })
        ));
    }
}
