//! Derivation of the visible transaction set.
//!
//! The visible set is a pure function of the store contents and the
//! active predicate. Nothing here is cached: callers evaluate it again
//! after every change to either input.

use crate::core::transaction::{Transaction, TransactionId, TransactionStatus};
use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status clause of a filter predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Verified,
    Rejected,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    pub fn matches(&self, status: TransactionStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == TransactionStatus::Pending,
            Self::Verified => status == TransactionStatus::Verified,
            Self::Rejected => status == TransactionStatus::Rejected,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown status filter: {other}")),
        }
    }
}

/// The three ANDed clauses the review list can be narrowed by.
///
/// An unset clause (status `All`, no date, blank beneficiary text)
/// never excludes anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    #[serde(default)]
    pub status: StatusFilter,
    /// Calendar day of creation, in the viewer's zone.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Case-insensitive substring of the beneficiary name.
    #[serde(default)]
    pub beneficiary: Option<String>,
}

impl FilterPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_beneficiary(mut self, text: impl Into<String>) -> Self {
        self.beneficiary = Some(text.into());
        self
    }

    /// The trimmed, lower-cased beneficiary needle, if it constrains anything.
    fn beneficiary_needle(&self) -> Option<String> {
        self.beneficiary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Evaluate all three clauses against one transaction, reading the
    /// creation day in `tz`.
    pub fn matches_in<Tz: TimeZone>(&self, tx: &Transaction, tz: &Tz) -> bool {
        if !self.status.matches(tx.status()) {
            return false;
        }
        if let Some(day) = self.date {
            if tx.created_at().with_timezone(tz).date_naive() != day {
                return false;
            }
        }
        match self.beneficiary_needle() {
            Some(needle) => tx.beneficiary_name().to_lowercase().contains(&needle),
            None => true,
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_in(tx, &Local)
    }
}

/// Visible subset of `transactions` under `predicate`, in store order,
/// with calendar days read in the local zone.
pub fn compute_visible<'a>(
    transactions: &'a [Transaction],
    predicate: &FilterPredicate,
) -> Vec<&'a Transaction> {
    compute_visible_in(transactions, predicate, &Local)
}

/// Same as [`compute_visible`] with an explicit zone for the date clause.
pub fn compute_visible_in<'a, Tz: TimeZone>(
    transactions: &'a [Transaction],
    predicate: &FilterPredicate,
    tz: &Tz,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| predicate.matches_in(tx, tz))
        .collect()
}

/// Identifiers of a visible slice, in order.
pub fn visible_ids(visible: &[&Transaction]) -> Vec<TransactionId> {
    visible.iter().map(|t| t.id().clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use chrono::{FixedOffset, Utc};
    use rust_decimal_macros::dec;

    fn tx(id: &str, name: &str, status: TransactionStatus, at: &str) -> Transaction {
        Transaction::new(id, name, "ACC", dec!(100), CurrencyCode::new("USD"))
            .with_status(status)
            .with_created_at(at.parse().unwrap())
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("1", "Ama Mensah", TransactionStatus::Pending, "2025-11-01T09:00:00Z"),
            tx("2", "Kofi Boateng", TransactionStatus::Verified, "2025-11-01T23:30:00Z"),
            tx("3", "Amara Obi", TransactionStatus::Rejected, "2025-11-02T10:00:00Z"),
            tx("4", "Lerato Dube", TransactionStatus::Submitted, "2025-11-02T11:00:00Z"),
        ]
    }

    fn ids(v: &[&Transaction]) -> Vec<String> {
        v.iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn test_empty_predicate_keeps_everything_in_order() {
        let txs = sample();
        let visible = compute_visible_in(&txs, &FilterPredicate::new(), &Utc);
        assert_eq!(ids(&visible), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_status_clause() {
        let txs = sample();
        let p = FilterPredicate::new().with_status(StatusFilter::Verified);
        assert_eq!(ids(&compute_visible_in(&txs, &p, &Utc)), vec!["2"]);
    }

    #[test]
    fn test_submitted_only_visible_under_all() {
        let txs = sample();
        for status in [StatusFilter::Pending, StatusFilter::Verified, StatusFilter::Rejected] {
            let p = FilterPredicate::new().with_status(status);
            assert!(!ids(&compute_visible_in(&txs, &p, &Utc)).contains(&"4".to_string()));
        }
    }

    #[test]
    fn test_date_clause_uses_calendar_day_in_zone() {
        let txs = sample();
        let day = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let p = FilterPredicate::new().with_date(day);
        assert_eq!(ids(&compute_visible_in(&txs, &p, &Utc)), vec!["1", "2"]);

        // 23:30Z on the 1st is already the 2nd at UTC+2.
        let sast = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(ids(&compute_visible_in(&txs, &p, &sast)), vec!["1"]);
    }

    #[test]
    fn test_beneficiary_clause_case_insensitive_substring() {
        let txs = sample();
        let p = FilterPredicate::new().with_beneficiary("AMA");
        assert_eq!(ids(&compute_visible_in(&txs, &p, &Utc)), vec!["1", "3"]);
    }

    #[test]
    fn test_blank_beneficiary_is_unset() {
        let txs = sample();
        let p = FilterPredicate::new().with_beneficiary("   ");
        assert_eq!(compute_visible_in(&txs, &p, &Utc).len(), 4);
    }

    #[test]
    fn test_clauses_are_conjunctive() {
        let txs = sample();
        let p = FilterPredicate::new()
            .with_status(StatusFilter::Pending)
            .with_beneficiary("obi");
        assert!(compute_visible_in(&txs, &p, &Utc).is_empty());
    }

    #[test]
    fn test_matches_agrees_with_compute_visible() {
        let txs = sample();
        let p = FilterPredicate::new().with_beneficiary("a");
        let visible = compute_visible_in(&txs, &p, &Utc);
        for t in &txs {
            assert_eq!(p.matches_in(t, &Utc), visible.iter().any(|v| v.id() == t.id()));
        }
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("Verified".parse::<StatusFilter>(), Ok(StatusFilter::Verified));
        assert!("submitted".parse::<StatusFilter>().is_err());
    }
}
