//! # settlement-review
//!
//! Staff review and batch-settlement workflow for cross-border payments.
//!
//! Employees narrow a list of customer transactions with a filter,
//! inspect one at a time, approve or reject pending ones, and submit
//! verified ones to the settlement network in batches.
//!
//! ## Architecture
//!
//! - **core** — Transactions, currencies, users and the transaction store
//! - **review** — Filter engine, selection tracker, status transitions, batch gate
//! - **backend** — Async transport seam and an in-memory implementation
//! - **dashboard** — Status counts and the pending preview
//! - **simulation** — Random review queues

pub mod backend;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod review;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::backend::{InMemoryBackend, TransactionBackend};
    pub use crate::config::ReviewConfig;
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::transaction::{Transaction, TransactionId, TransactionStatus};
    pub use crate::core::user::{CurrentUser, Role, StaticSession, UserSession};
    pub use crate::dashboard::DashboardSummary;
    pub use crate::error::{ReviewError, ValidationError};
    pub use crate::review::{
        BatchReceipt, FilterPredicate, ReviewWorkspace, StatusFilter, TransitionOutcome,
    };
}
