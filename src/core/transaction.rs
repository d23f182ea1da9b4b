use crate::core::currency::CurrencyCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-issued identifier of a payment transaction. Unique and stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Review status of a transaction.
///
/// Valid transitions:
/// - Pending → Verified (approve)
/// - Pending → Rejected (reject)
/// - Verified → Submitted (batch settlement only)
///
/// Rejected and Submitted are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransactionStatus {
    Pending,
    Verified,
    Rejected,
    Submitted,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 4] = [
        Self::Pending,
        Self::Verified,
        Self::Rejected,
        Self::Submitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Submitted => "submitted",
        }
    }

    /// Case-insensitive parse; the backend is not consistent about casing.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            "submitted" => Some(Self::Submitted),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Verified)
                | (Self::Pending, Self::Rejected)
                | (Self::Verified, Self::Submitted)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Submitted)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for TransactionStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown transaction status: {value}"))
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A cross-border payment awaiting staff review.
///
/// Field names follow the backend payload; `_id` and `createdAt` are
/// accepted as aliases.
///
/// # Examples
///
/// ```
/// use settlement_review::core::transaction::{Transaction, TransactionStatus};
/// use settlement_review::core::currency::CurrencyCode;
/// use rust_decimal_macros::dec;
///
/// let tx = Transaction::new("tx-1", "Ama Mensah", "GB29NWBK60161331926819", dec!(2500), CurrencyCode::new("GBP"))
///     .with_bank("NatWest", "GB")
///     .with_swift_code("NWBKGB2L");
///
/// assert_eq!(tx.status(), TransactionStatus::Pending);
/// assert_eq!(tx.swift_code(), Some("NWBKGB2L"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    id: TransactionId,
    beneficiary_name: String,
    beneficiary_account_number: String,
    /// Always positive.
    amount: Decimal,
    currency: CurrencyCode,
    bank_name: String,
    bank_country: String,
    /// Settlement-network routing code (SWIFT/BIC).
    swift_code: Option<String>,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
    customer_name: Option<String>,
    /// Assigned by the backend once the transaction has been settled.
    settlement_reference: Option<String>,
}

/// Wire shape of a transaction, checked before it becomes a [`Transaction`].
#[derive(Deserialize)]
struct TransactionRecord {
    #[serde(alias = "_id")]
    id: TransactionId,
    beneficiary_name: String,
    beneficiary_account_number: String,
    amount: Decimal,
    currency: CurrencyCode,
    #[serde(default)]
    bank_name: String,
    #[serde(default)]
    bank_country: String,
    #[serde(default)]
    swift_code: Option<String>,
    status: TransactionStatus,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    settlement_reference: Option<String>,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = String;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        if record.amount <= Decimal::ZERO {
            return Err(format!(
                "transaction {} has non-positive amount {}",
                record.id, record.amount
            ));
        }
        Ok(Self {
            id: record.id,
            beneficiary_name: record.beneficiary_name,
            beneficiary_account_number: record.beneficiary_account_number,
            amount: record.amount,
            currency: record.currency,
            bank_name: record.bank_name,
            bank_country: record.bank_country,
            swift_code: record.swift_code,
            status: record.status,
            created_at: record.created_at,
            customer_name: record.customer_name,
            settlement_reference: record.settlement_reference,
        })
    }
}

impl Transaction {
    /// Create a pending transaction created now.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn new(
        id: impl Into<String>,
        beneficiary_name: impl Into<String>,
        beneficiary_account_number: impl Into<String>,
        amount: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        assert!(
            amount > Decimal::ZERO,
            "Transaction amount must be positive, got {}",
            amount
        );
        Self {
            id: TransactionId::new(id),
            beneficiary_name: beneficiary_name.into(),
            beneficiary_account_number: beneficiary_account_number.into(),
            amount,
            currency,
            bank_name: String::new(),
            bank_country: String::new(),
            swift_code: None,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            customer_name: None,
            settlement_reference: None,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_bank(mut self, name: impl Into<String>, country: impl Into<String>) -> Self {
        self.bank_name = name.into();
        self.bank_country = country.into();
        self
    }

    pub fn with_swift_code(mut self, code: impl Into<String>) -> Self {
        self.swift_code = Some(code.into());
        self
    }

    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    /// Overwrite the status. Callers are responsible for checking the transition.
    pub(crate) fn set_status(&mut self, status: TransactionStatus) {
        self.status = status;
    }

    pub(crate) fn set_settlement_reference(&mut self, reference: impl Into<String>) {
        self.settlement_reference = Some(reference.into());
    }

    // --- Accessors ---

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn beneficiary_name(&self) -> &str {
        &self.beneficiary_name
    }

    pub fn beneficiary_account_number(&self) -> &str {
        &self.beneficiary_account_number
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn bank_country(&self) -> &str {
        &self.bank_country
    }

    pub fn swift_code(&self) -> Option<&str> {
        self.swift_code.as_deref()
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn settlement_reference(&self) -> Option<&str> {
        self.settlement_reference.as_deref()
    }
}
