//! Synchronous review state.
//!
//! Every method here is one discrete reaction: a user intent, or the
//! arrival of a backend response. The async [`ReviewWorkspace`] calls
//! `begin_*` before a request and `finish_*` after it, and never holds
//! the state across the request itself.
//!
//! [`ReviewWorkspace`]: crate::review::workspace::ReviewWorkspace

use crate::core::store::TransactionStore;
use crate::core::transaction::{Transaction, TransactionId, TransactionStatus};
use crate::error::{ReviewError, ValidationError};
use crate::review::batch::{BatchPlan, BatchSubmissionGate};
use crate::review::filter::{self, FilterPredicate, StatusFilter};
use crate::review::selection::SelectionSet;
use crate::review::session::ReviewSession;
use crate::review::transition::{ActionLocks, ReviewAction, TransitionController, TransitionOutcome};
use chrono::{FixedOffset, NaiveDate};
use log::{debug, info, warn};

#[derive(Debug, Default)]
pub struct ReviewState {
    store: TransactionStore,
    predicate: FilterPredicate,
    selection: SelectionSet,
    locks: ActionLocks,
    batch_in_flight: bool,
    details: Option<ReviewSession>,
    next_ticket: u64,
    closed: bool,
    /// Zone for the date clause. `None` reads days in the local zone.
    zone: Option<FixedOffset>,
}

impl ReviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(zone: FixedOffset) -> Self {
        Self {
            zone: Some(zone),
            ..Self::default()
        }
    }

    // --- Derived view ---

    /// The visible set under the current predicate, in store order.
    pub fn visible(&self) -> Vec<&Transaction> {
        match &self.zone {
            Some(zone) => filter::compute_visible_in(self.store.transactions(), &self.predicate, zone),
            None => filter::compute_visible(self.store.transactions(), &self.predicate),
        }
    }

    pub fn visible_ids(&self) -> Vec<TransactionId> {
        filter::visible_ids(&self.visible())
    }

    /// Re-derive the visible set and prune the selection against it.
    /// Runs at the end of every mutation of the store or the predicate.
    fn sync_selection(&mut self) {
        let visible = self.visible_ids();
        self.selection.reconcile(&visible);
        debug_assert!(self.selection.is_subset_of(&visible));
    }

    // --- Store ---

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.store.transactions()
    }

    /// Replace the store with a full fetch. Ignored once the view is closed.
    pub fn replace_transactions(&mut self, transactions: Vec<Transaction>) -> bool {
        if self.closed {
            warn!("review: discarding refetch of {} transaction(s) after close", transactions.len());
            return false;
        }
        debug!("review: store replaced with {} transaction(s)", transactions.len());
        self.store.replace_all(transactions);
        self.sync_selection();
        true
    }

    // --- Predicate ---

    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }

    pub fn set_predicate(&mut self, predicate: FilterPredicate) {
        self.predicate = predicate;
        self.sync_selection();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.predicate.status = status;
        self.sync_selection();
    }

    pub fn set_date_filter(&mut self, date: Option<NaiveDate>) {
        self.predicate.date = date;
        self.sync_selection();
    }

    pub fn set_beneficiary_filter(&mut self, text: Option<String>) {
        self.predicate.beneficiary = text;
        self.sync_selection();
    }

    // --- Selection ---

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Toggle a visible id. Ids outside the visible set are ignored.
    pub fn toggle(&mut self, id: &TransactionId) -> bool {
        if !self.visible().iter().any(|t| t.id() == id) {
            debug!("review: ignoring toggle of hidden transaction {}", id);
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn select_all(&mut self) {
        let visible = self.visible_ids();
        self.selection.select_all(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_all();
    }

    // --- Approve / reject ---

    pub fn is_in_flight(&self, id: &TransactionId) -> bool {
        self.locks.is_locked(id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.locks.len()
    }

    /// Accept or refuse an approve/reject intent.
    ///
    /// Returns a validation error if the intent is invalid, `Ok(None)` if
    /// an action for `id` is already outstanding (the intent is ignored),
    /// and `Ok(Some(target))` if the request may be sent. On `Ok(Some(_))` the id is
    /// locked until [`ReviewState::finish_action`].
    pub fn begin_action(
        &mut self,
        id: &TransactionId,
        action: &ReviewAction,
    ) -> Result<Option<TransactionStatus>, ReviewError> {
        // Validation runs first: a blank reason is an error even while locked.
        let target = TransitionController::validate(id, self.store.status_of(id), action)
            .inspect_err(|err| warn!("review: {} of {} refused: {}", action, id, err))?;
        if !self.locks.try_lock(id) {
            debug!("review: {} of {} ignored, action already in flight", action, id);
            return Ok(None);
        }
        Ok(Some(target))
    }

    /// Apply the backend's answer to an accepted intent.
    pub fn finish_action(
        &mut self,
        id: &TransactionId,
        target: TransactionStatus,
        result: Result<(), ReviewError>,
    ) -> Result<TransitionOutcome, ReviewError> {
        self.locks.release(id);
        if let Err(err) = result {
            warn!("review: {} -> {} failed: {}", id, target, err);
            return Err(err);
        }
        if self.closed {
            warn!("review: {} -> {} confirmed after close, discarding", id, target);
            return Ok(TransitionOutcome::Discarded);
        }
        // A refetch during the request may have removed the record; the
        // refetch wins.
        if self.store.apply_status(id, target).is_none() {
            warn!("review: {} vanished before its {} confirmation", id, target);
            return Ok(TransitionOutcome::Discarded);
        }
        info!("review: transaction {} is now {}", id, target);
        if self.details.as_ref().map(|s| s.id() == id).unwrap_or(false) {
            self.details = None;
        }
        self.sync_selection();
        Ok(TransitionOutcome::Applied(target))
    }

    // --- Batch ---

    pub fn is_batch_in_flight(&self) -> bool {
        self.batch_in_flight
    }

    /// Validate the current selection for settlement and lock its ids.
    pub fn begin_batch(&mut self) -> Result<BatchPlan, ReviewError> {
        if self.batch_in_flight {
            return Err(ValidationError::BatchInFlight.into());
        }
        let plan = BatchSubmissionGate::validate(&self.selection, self.store.transactions())?;
        if let Some(id) = self.locks.any_locked(plan.ids().iter()) {
            warn!("review: batch refused, {} has an action in flight", id);
            return Err(ValidationError::ActionInFlight(id).into());
        }
        for id in plan.ids() {
            TransitionController::validate_settlement(id, self.store.status_of(id))?;
        }
        for id in plan.ids() {
            self.locks.try_lock(id);
        }
        self.batch_in_flight = true;
        Ok(plan)
    }

    /// Apply the backend's answer to a dispatched batch.
    pub fn finish_batch(
        &mut self,
        plan: &BatchPlan,
        result: Result<usize, ReviewError>,
    ) -> Result<usize, ReviewError> {
        for id in plan.ids() {
            self.locks.release(id);
        }
        self.batch_in_flight = false;
        let submitted = result?;
        if self.closed {
            warn!("review: batch of {} confirmed after close, discarding", plan.len());
            return Ok(submitted);
        }
        for id in plan.ids() {
            self.store.apply_status(id, TransactionStatus::Submitted);
        }
        self.selection.clear_all();
        self.sync_selection();
        Ok(submitted)
    }

    // --- Detail view ---

    /// Open a detail view for `id`, replacing any open one. Returns the
    /// ticket the fetch result must present.
    pub fn begin_details(&mut self, id: &TransactionId) -> u64 {
        self.next_ticket += 1;
        self.details = Some(ReviewSession::loading(id.clone(), self.next_ticket));
        self.next_ticket
    }

    /// Store a detail fetch result if its view is still the open one.
    pub fn finish_details(&mut self, ticket: u64, result: Result<Transaction, ReviewError>) -> bool {
        match self.details.as_mut() {
            Some(session) if session.ticket() == ticket && !self.closed => {
                session.resolve(result);
                true
            }
            _ => {
                debug!("review: dropping stale detail response (ticket {})", ticket);
                false
            }
        }
    }

    pub fn details(&self) -> Option<&ReviewSession> {
        self.details.as_ref()
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    // --- Teardown ---

    /// Tear the view down. Responses that arrive afterwards change nothing.
    pub fn close(&mut self) {
        self.closed = true;
        self.details = None;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn tx(id: &str, name: &str, status: TransactionStatus) -> Transaction {
        Transaction::new(id, name, "ACC", dec!(250), CurrencyCode::new("USD"))
            .with_status(status)
            .with_created_at("2025-11-03T12:00:00Z".parse().unwrap())
    }

    fn state() -> ReviewState {
        let mut s = ReviewState::with_zone(FixedOffset::east_opt(0).unwrap());
        s.replace_transactions(vec![
            tx("1", "Ama Mensah", TransactionStatus::Pending),
            tx("2", "Kofi Boateng", TransactionStatus::Verified),
            tx("3", "Amara Obi", TransactionStatus::Rejected),
        ]);
        s
    }

    fn id(s: &str) -> TransactionId {
        TransactionId::new(s)
    }

    #[test]
    fn test_filter_change_prunes_selection() {
        let mut s = state();
        s.select_all();
        assert_eq!(s.selection().len(), 3);
        s.set_status_filter(StatusFilter::Verified);
        assert!(s.selection().equals(&[id("2")]));
    }

    #[test]
    fn test_toggle_hidden_id_is_ignored() {
        let mut s = state();
        s.set_beneficiary_filter(Some("kofi".into()));
        assert!(!s.toggle(&id("1")));
        assert!(s.selection().is_empty());
        assert!(s.toggle(&id("2")));
    }

    #[test]
    fn test_duplicate_intent_ignored_while_locked() {
        let mut s = state();
        let first = s.begin_action(&id("1"), &ReviewAction::approve()).unwrap();
        assert_eq!(first, Some(TransactionStatus::Verified));
        assert!(s.is_in_flight(&id("1")));
        let second = s.begin_action(&id("1"), &ReviewAction::reject("dup")).unwrap();
        assert_eq!(second, None);
    }

    #[test]
    fn test_blank_reject_on_locked_id_is_still_refused() {
        let mut s = state();
        s.begin_action(&id("1"), &ReviewAction::approve()).unwrap();
        let err = s.begin_action(&id("1"), &ReviewAction::reject("   ")).unwrap_err();
        assert_eq!(err, ReviewError::from(ValidationError::ReasonRequired));
        assert!(s.is_in_flight(&id("1")));
    }

    #[test]
    fn test_failed_action_leaves_status_and_releases_lock() {
        let mut s = state();
        let target = s.begin_action(&id("1"), &ReviewAction::approve()).unwrap().unwrap();
        let err = s
            .finish_action(&id("1"), target, Err(ReviewError::RequestFailed { message: None }))
            .unwrap_err();
        assert_eq!(err.error_code(), "REQUEST_FAILED");
        assert_eq!(s.store().status_of(&id("1")), Some(TransactionStatus::Pending));
        assert!(!s.is_in_flight(&id("1")));
    }

    #[test]
    fn test_approve_moves_out_of_pending_view() {
        let mut s = state();
        s.set_status_filter(StatusFilter::Pending);
        s.select_all();
        let target = s.begin_action(&id("1"), &ReviewAction::approve()).unwrap().unwrap();
        let outcome = s.finish_action(&id("1"), target, Ok(())).unwrap();
        assert_eq!(outcome, TransitionOutcome::Applied(TransactionStatus::Verified));
        assert!(s.visible().is_empty());
        assert!(s.selection().is_empty());
    }

    #[test]
    fn test_confirmation_after_close_is_discarded() {
        let mut s = state();
        let target = s.begin_action(&id("1"), &ReviewAction::approve()).unwrap().unwrap();
        s.close();
        let outcome = s.finish_action(&id("1"), target, Ok(())).unwrap();
        assert_eq!(outcome, TransitionOutcome::Discarded);
        assert_eq!(s.store().status_of(&id("1")), Some(TransactionStatus::Pending));
        assert!(!s.replace_transactions(Vec::new()));
        assert_eq!(s.transactions().len(), 3);
    }

    #[test]
    fn test_batch_locks_and_blocks_second_batch() {
        let mut s = state();
        s.set_status_filter(StatusFilter::Verified);
        s.select_all();
        let plan = s.begin_batch().unwrap();
        assert!(s.is_in_flight(&id("2")));
        assert_eq!(
            s.begin_batch().unwrap_err(),
            ReviewError::from(ValidationError::BatchInFlight)
        );
        s.finish_batch(&plan, Ok(1)).unwrap();
        assert_eq!(s.store().status_of(&id("2")), Some(TransactionStatus::Submitted));
        assert!(s.selection().is_empty());
        assert!(!s.is_batch_in_flight());
    }

    #[test]
    fn test_batch_refused_while_member_has_action_in_flight() {
        let mut s = state();
        s.replace_transactions(vec![
            tx("2", "Kofi Boateng", TransactionStatus::Verified),
            tx("4", "Zola Nkosi", TransactionStatus::Pending),
        ]);
        s.toggle(&id("2"));
        // Simulate an outstanding request against a selected id.
        s.locks.try_lock(&id("2"));
        assert_eq!(
            s.begin_batch().unwrap_err(),
            ReviewError::from(ValidationError::ActionInFlight(id("2")))
        );
    }

    #[test]
    fn test_stale_detail_response_dropped() {
        let mut s = state();
        let first = s.begin_details(&id("1"));
        let second = s.begin_details(&id("2"));
        assert!(!s.finish_details(first, Ok(tx("1", "Ama Mensah", TransactionStatus::Pending))));
        assert!(s.finish_details(second, Ok(tx("2", "Kofi Boateng", TransactionStatus::Verified))));
        assert_eq!(s.details().and_then(|d| d.transaction()).map(|t| t.id().as_str()), Some("2"));
    }

    #[test]
    fn test_local_zone_state_still_filters() {
        let mut s = ReviewState::new();
        s.replace_transactions(vec![tx("9", "X", TransactionStatus::Pending)]);
        let today = Utc::now().date_naive();
        s.set_date_filter(Some(today));
        // The sample is dated in 2025, never today.
        assert!(s.visible().is_empty());
    }
}
