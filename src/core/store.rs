use crate::core::transaction::{Transaction, TransactionId, TransactionStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The client-side copy of the backend's transaction list.
///
/// Order is the order the backend returned and is preserved by every
/// derived view. The store is either replaced wholesale (refetch) or
/// patched one status at a time after a confirmed approve/reject.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a fresh fetch. A refetch always wins
    /// over local patches; no field-level merging happens.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.get(id).is_some()
    }

    pub fn status_of(&self, id: &TransactionId) -> Option<TransactionStatus> {
        self.get(id).map(Transaction::status)
    }

    /// Overwrite the status of one record. Returns the previous status,
    /// or `None` if the id is not in the store.
    pub fn apply_status(
        &mut self,
        id: &TransactionId,
        status: TransactionStatus,
    ) -> Option<TransactionStatus> {
        let tx = self.transactions.iter_mut().find(|t| t.id() == id)?;
        let previous = tx.status();
        tx.set_status(status);
        Some(previous)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn ids(&self) -> Vec<TransactionId> {
        self.transactions.iter().map(|t| t.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of transactions in each status.
    pub fn count_by_status(&self) -> HashMap<TransactionStatus, usize> {
        let mut counts = HashMap::new();
        for tx in &self.transactions {
            *counts.entry(tx.status()).or_insert(0) += 1;
        }
        counts
    }
}

impl FromIterator<Transaction> for TransactionStore {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
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

    #[test]
    fn test_apply_status_returns_previous() {
        let mut store: TransactionStore = vec![tx("1", TransactionStatus::Pending)]
            .into_iter()
            .collect();
        let id = TransactionId::new("1");
        let prev = store.apply_status(&id, TransactionStatus::Verified);
        assert_eq!(prev, Some(TransactionStatus::Pending));
        assert_eq!(store.status_of(&id), Some(TransactionStatus::Verified));
    }

    #[test]
    fn test_apply_status_unknown_id() {
        let mut store = TransactionStore::new();
        assert_eq!(
            store.apply_status(&TransactionId::new("x"), TransactionStatus::Verified),
            None
        );
    }

    #[test]
    fn test_replace_all_preserves_order() {
        let mut store = TransactionStore::new();
        store.replace_all(vec![
            tx("b", TransactionStatus::Pending),
            tx("a", TransactionStatus::Verified),
            tx("c", TransactionStatus::Pending),
        ]);
        let ids: Vec<_> = store.ids().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(store.count_by_status()[&TransactionStatus::Pending], 2);
    }
}
