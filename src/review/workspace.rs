//! The review workflow as seen by the presentation layer.
//!
//! [`ReviewWorkspace`] owns a [`ReviewState`] behind a mutex and a handle
//! to the backend. Each entry point takes the lock for one synchronous
//! step, releases it for the network call, and takes it again to apply
//! the answer. Actions on different transactions can therefore overlap,
//! while each individual state change stays atomic.

use crate::backend::TransactionBackend;
use crate::config::ReviewConfig;
use crate::core::transaction::{Transaction, TransactionId};
use crate::core::user::{CurrentUser, UserSession};
use crate::error::ReviewError;
use crate::review::batch::{BatchReceipt, BatchSubmissionGate};
use crate::review::filter::{FilterPredicate, StatusFilter};
use crate::review::session::ReviewSession;
use crate::review::state::ReviewState;
use crate::review::transition::{ReviewAction, TransitionOutcome};
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Read-only snapshot of everything the list view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewView {
    pub predicate: FilterPredicate,
    pub visible: Vec<Transaction>,
    pub selection: Vec<TransactionId>,
    pub in_flight: Vec<TransactionId>,
    pub batch_in_flight: bool,
}

impl ReviewView {
    pub fn is_selected(&self, id: &TransactionId) -> bool {
        self.selection.contains(id)
    }

    pub fn is_in_flight(&self, id: &TransactionId) -> bool {
        self.in_flight.contains(id)
    }

    /// Whether every visible row is ticked (the select-all checkbox).
    pub fn all_selected(&self) -> bool {
        !self.visible.is_empty() && self.selection.len() == self.visible.len()
    }
}

pub struct ReviewWorkspace {
    backend: Arc<dyn TransactionBackend>,
    config: ReviewConfig,
    user: CurrentUser,
    state: Mutex<ReviewState>,
}

impl ReviewWorkspace {
    /// Open the workflow for the signed-in user.
    ///
    /// Fails with `Unauthenticated` when nobody is signed in and with
    /// `Forbidden` when the user lacks the configured role. The store
    /// starts empty; call [`ReviewWorkspace::refresh`] to populate it.
    pub fn open(
        session: &dyn UserSession,
        backend: Arc<dyn TransactionBackend>,
        config: ReviewConfig,
    ) -> Result<Self, ReviewError> {
        let user = session.current_user().ok_or(ReviewError::Unauthenticated)?;
        if !user.has_role(config.required_role) {
            warn!("review: {} ({}) denied, role {}", user.display_name, user.id, user.role);
            return Err(ReviewError::Forbidden { role: user.role });
        }
        let state = match config.zone() {
            Ok(Some(zone)) => ReviewState::with_zone(zone),
            Ok(None) => ReviewState::new(),
            Err(err) => {
                warn!("review: {}, falling back to local zone", err);
                ReviewState::new()
            }
        };
        info!("review: workspace opened for {}", user.display_name);
        Ok(Self {
            backend,
            config,
            user,
            state: Mutex::new(state),
        })
    }

    /// Open and populate in one step, as the view does on mount.
    pub async fn mount(
        session: &dyn UserSession,
        backend: Arc<dyn TransactionBackend>,
        config: ReviewConfig,
    ) -> Result<Self, ReviewError> {
        let workspace = Self::open(session, backend, config)?;
        workspace.refresh().await?;
        Ok(workspace)
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Direct access to the state for read-only inspection.
    pub async fn state(&self) -> MutexGuard<'_, ReviewState> {
        self.state.lock().await
    }

    pub async fn view(&self) -> ReviewView {
        let state = self.state.lock().await;
        let in_flight = state
            .transactions()
            .iter()
            .map(|t| t.id())
            .filter(|id| state.is_in_flight(id))
            .cloned()
            .collect();
        ReviewView {
            predicate: state.predicate().clone(),
            visible: state.visible().into_iter().cloned().collect(),
            selection: state.selection().iter().cloned().collect(),
            in_flight,
            batch_in_flight: state.is_batch_in_flight(),
        }
    }

    /// Full refetch. Replaces the store wholesale on success; leaves it
    /// untouched on failure. Returns the number of transactions fetched.
    pub async fn refresh(&self) -> Result<usize, ReviewError> {
        self.refetch().await.map(|(count, _)| count)
    }

    /// Fetch everything and hand it to the state. The flag is false when
    /// the state discarded the result because the view was closed.
    async fn refetch(&self) -> Result<(usize, bool), ReviewError> {
        match self.backend.fetch_all_transactions().await {
            Ok(transactions) => {
                let count = transactions.len();
                let applied = self.state.lock().await.replace_transactions(transactions);
                Ok((count, applied))
            }
            Err(err) => {
                warn!("review: failed to load transactions: {}", err);
                Err(err.into())
            }
        }
    }

    // --- Filtering and selection ---

    pub async fn set_predicate(&self, predicate: FilterPredicate) {
        self.state.lock().await.set_predicate(predicate);
    }

    pub async fn set_status_filter(&self, status: StatusFilter) {
        self.state.lock().await.set_status_filter(status);
    }

    pub async fn set_date_filter(&self, date: Option<NaiveDate>) {
        self.state.lock().await.set_date_filter(date);
    }

    pub async fn set_beneficiary_filter(&self, text: Option<String>) {
        self.state.lock().await.set_beneficiary_filter(text);
    }

    pub async fn toggle(&self, id: &TransactionId) -> bool {
        self.state.lock().await.toggle(id)
    }

    pub async fn select_all(&self) {
        self.state.lock().await.select_all();
    }

    pub async fn clear_selection(&self) {
        self.state.lock().await.clear_selection();
    }

    pub async fn is_action_in_flight(&self, id: &TransactionId) -> bool {
        self.state.lock().await.is_in_flight(id)
    }

    // --- Approve / reject ---

    pub async fn approve(
        &self,
        id: &TransactionId,
        note: Option<String>,
    ) -> Result<TransitionOutcome, ReviewError> {
        self.act(id, ReviewAction::Approve { note }).await
    }

    pub async fn reject(
        &self,
        id: &TransactionId,
        reason: impl Into<String>,
    ) -> Result<TransitionOutcome, ReviewError> {
        self.act(id, ReviewAction::reject(reason)).await
    }

    async fn act(
        &self,
        id: &TransactionId,
        action: ReviewAction,
    ) -> Result<TransitionOutcome, ReviewError> {
        let target = match self.state.lock().await.begin_action(id, &action)? {
            Some(target) => target,
            None => return Ok(TransitionOutcome::Ignored),
        };

        let result = match &action {
            ReviewAction::Approve { note } => {
                self.backend
                    .approve_transaction(id, note.as_deref().unwrap_or(""))
                    .await
            }
            ReviewAction::Reject { reason } => {
                self.backend.reject_transaction(id, reason.trim()).await
            }
        };

        self.state
            .lock()
            .await
            .finish_action(id, target, result.map_err(ReviewError::from))
    }

    // --- Batch settlement ---

    /// Submit the current selection to the settlement network.
    ///
    /// Validation failures and backend rejections leave the store and the
    /// selection exactly as they were. On success the submitted rows are
    /// marked `submitted`, the selection is cleared, and the store is
    /// refetched. A failed or discarded refetch does not undo the
    /// settlement; it is reported through `BatchReceipt::refreshed`.
    pub async fn submit(&self) -> Result<BatchReceipt, ReviewError> {
        let plan = self.state.lock().await.begin_batch()?;
        let network = self.config.settlement_network.as_str();

        let result = BatchSubmissionGate::dispatch(self.backend.as_ref(), &plan, network).await;
        let submitted_count = self.state.lock().await.finish_batch(&plan, result)?;

        let refreshed = if self.config.refresh_after_batch {
            match self.refetch().await {
                Ok((_, applied)) => applied,
                Err(err) => {
                    warn!("review: refetch after batch failed: {}", err);
                    false
                }
            }
        } else {
            false
        };

        Ok(BatchReceipt {
            submitted_count,
            ids: plan.ids().to_vec(),
            refreshed,
        })
    }

    // --- Detail view ---

    /// Open the detail view for `id` and load its snapshot.
    ///
    /// Returns the session as it stood when the fetch resolved. If the view
    /// was closed or another one opened in the meantime, the returned
    /// session carries the result but the workspace no longer holds it.
    pub async fn open_details(&self, id: &TransactionId) -> ReviewSession {
        let ticket = self.state.lock().await.begin_details(id);
        let result = self
            .backend
            .fetch_transaction_by_id(id)
            .await
            .map_err(ReviewError::from);

        let mut state = self.state.lock().await;
        let mut session = ReviewSession::loading(id.clone(), ticket);
        session.resolve(result.clone());
        state.finish_details(ticket, result);
        session
    }

    pub async fn details(&self) -> Option<ReviewSession> {
        self.state.lock().await.details().cloned()
    }

    pub async fn close_details(&self) {
        self.state.lock().await.close_details();
    }

    /// Tear the view down. In-flight requests complete on the backend but
    /// their results no longer touch local state.
    pub async fn close(&self) {
        self.state.lock().await.close();
        info!("review: workspace closed for {}", self.user.display_name);
    }
}
