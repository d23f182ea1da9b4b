use crate::core::transaction::{Transaction, TransactionStatus};
use serde::{Deserialize, Serialize};

/// One row of the "awaiting review" preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPreview {
    pub id: String,
    pub beneficiary_name: String,
    pub amount: String,
    pub currency: String,
}

/// Status counts and the head of the review queue for the employee dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub pending: usize,
    pub verified: usize,
    pub rejected: usize,
    pub submitted: usize,
    /// First pending transactions in store order.
    pub pending_preview: Vec<PendingPreview>,
}

impl DashboardSummary {
    /// Summarise a transaction list, previewing at most `preview_limit`
    /// pending transactions.
    pub fn from_transactions(transactions: &[Transaction], preview_limit: usize) -> Self {
        let count = |status: TransactionStatus| {
            transactions.iter().filter(|t| t.status() == status).count()
        };

        let pending_preview = transactions
            .iter()
            .filter(|t| t.status() == TransactionStatus::Pending)
            .take(preview_limit)
            .map(|t| PendingPreview {
                id: t.id().to_string(),
                beneficiary_name: t.beneficiary_name().to_string(),
                amount: t.amount().to_string(),
                currency: t.currency().to_string(),
            })
            .collect();

        DashboardSummary {
            total: transactions.len(),
            pending: count(TransactionStatus::Pending),
            verified: count(TransactionStatus::Verified),
            rejected: count(TransactionStatus::Rejected),
            submitted: count(TransactionStatus::Submitted),
            pending_preview,
        }
    }

    /// Share of reviewed transactions (verified, rejected or submitted)
    /// that were approved.
    pub fn verified_ratio(&self) -> f64 {
        let approved = self.verified + self.submitted;
        let reviewed = approved + self.rejected;
        if reviewed == 0 {
            return 0.0;
        }
        approved as f64 / reviewed as f64
    }
}

impl std::fmt::Display for DashboardSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Review Dashboard ===")?;
        writeln!(f, "Total Transactions: {}", self.total)?;
        writeln!(f, "Pending Review:     {}", self.pending)?;
        writeln!(f, "Verified:           {}", self.verified)?;
        writeln!(f, "Rejected:           {}", self.rejected)?;
        writeln!(f, "Submitted:          {}", self.submitted)?;
        writeln!(f, "Approval Rate:      {:.1}%", self.verified_ratio() * 100.0)?;

        if self.pending_preview.is_empty() {
            writeln!(f, "\nNo transactions awaiting review.")?;
        } else {
            writeln!(f, "\nAwaiting Review:")?;
            for row in &self.pending_preview {
                writeln!(
                    f,
                    "  {}  {}  {} {}",
                    row.id, row.beneficiary_name, row.amount, row.currency
                )?;
            }
        }
        Ok(())
    }
}
