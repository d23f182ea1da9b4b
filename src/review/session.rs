use crate::core::transaction::{Transaction, TransactionId, TransactionStatus};
use crate::error::ReviewError;

/// Loading state of a detail view.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Loaded(Transaction),
    Failed(ReviewError),
}

/// One opened detail view: the snapshot fetched by id and its load state.
///
/// Sessions are throwaway. Closing the view drops the session, and a
/// fetch that resolves for a session that is no longer current is
/// ignored by the workspace (see `ReviewWorkspace::open_details`).
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSession {
    id: TransactionId,
    ticket: u64,
    state: SessionState,
}

impl ReviewSession {
    pub(crate) fn loading(id: TransactionId, ticket: u64) -> Self {
        Self {
            id,
            ticket,
            state: SessionState::Loading,
        }
    }

    pub(crate) fn resolve(&mut self, result: Result<Transaction, ReviewError>) {
        self.state = match result {
            Ok(tx) => SessionState::Loaded(tx),
            Err(err) => SessionState::Failed(err),
        };
    }

    pub(crate) fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading)
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        match &self.state {
            SessionState::Loaded(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ReviewError> {
        match &self.state {
            SessionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Whether approve/reject should be offered: the snapshot is loaded,
    /// still pending, and no action for it is outstanding.
    pub fn can_act(&self, action_in_flight: bool) -> bool {
        !action_in_flight
            && self
                .transaction()
                .map(|t| t.status() == TransactionStatus::Pending)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use rust_decimal_macros::dec;

    fn tx(status: TransactionStatus) -> Transaction {
        Transaction::new("d1", "B", "ACC", dec!(5), CurrencyCode::new("USD")).with_status(status)
    }

    #[test]
    fn test_loading_session_cannot_act() {
        let session = ReviewSession::loading(TransactionId::new("d1"), 1);
        assert!(session.is_loading());
        assert!(!session.can_act(false));
    }

    #[test]
    fn test_pending_snapshot_can_act_unless_in_flight() {
        let mut session = ReviewSession::loading(TransactionId::new("d1"), 1);
        session.resolve(Ok(tx(TransactionStatus::Pending)));
        assert!(session.can_act(false));
        assert!(!session.can_act(true));
    }

    #[test]
    fn test_verified_snapshot_cannot_act() {
        let mut session = ReviewSession::loading(TransactionId::new("d1"), 1);
        session.resolve(Ok(tx(TransactionStatus::Verified)));
        assert!(!session.can_act(false));
    }

    #[test]
    fn test_failed_session_keeps_error() {
        let mut session = ReviewSession::loading(TransactionId::new("d1"), 1);
        session.resolve(Err(ReviewError::NotFound(TransactionId::new("d1"))));
        assert_eq!(session.error().map(|e| e.error_code()), Some("NOT_FOUND"));
        assert!(session.transaction().is_none());
    }
}
