//! The review and batch-settlement workflow.
//!
//! - `filter` derives the visible set from the store and the predicate
//! - `selection` tracks ticked ids and prunes them against the visible set
//! - `transition` validates approve/reject and tracks in-flight ids
//! - `batch` validates and dispatches settlement batches
//! - `session` holds one detail view
//! - `state` ties the above together synchronously
//! - `workspace` drives `state` around async backend calls

pub mod batch;
pub mod filter;
pub mod selection;
pub mod session;
pub mod state;
pub mod transition;
pub mod workspace;

pub use batch::{BatchPlan, BatchReceipt, BatchSubmissionGate};
pub use filter::{compute_visible, compute_visible_in, FilterPredicate, StatusFilter};
pub use selection::SelectionSet;
pub use session::{ReviewSession, SessionState};
pub use state::ReviewState;
pub use transition::{ActionLocks, ReviewAction, TransitionController, TransitionOutcome};
pub use workspace::{ReviewView, ReviewWorkspace};
