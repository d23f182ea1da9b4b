//! Random review queues for demos, benchmarks and the `generate` command.

use crate::core::currency::CurrencyCode;
use crate::core::transaction::{Transaction, TransactionStatus};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

const BENEFICIARIES: &[&str] = &[
    "Ama Mensah",
    "Kofi Boateng",
    "Amara Obi",
    "Lerato Dube",
    "Thabo Nkosi",
    "Priya Raman",
    "Mateus Silva",
    "Chen Wei",
    "Fatima Bello",
    "Johan de Villiers",
];

const BANKS: &[(&str, &str, &str)] = &[
    ("Standard Bank", "ZA", "SBZAZAJJ"),
    ("GCB Bank", "GH", "GHCBGHAC"),
    ("Access Bank", "NG", "ABNGNGLA"),
    ("State Bank of India", "IN", "SBININBB"),
    ("Banco do Brasil", "BR", "BRASBRRJ"),
    ("HSBC", "GB", "MIDLGB22"),
];

/// Shape of a generated review queue.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Number of transactions.
    pub size: usize,
    /// Currencies to draw from.
    pub currencies: Vec<CurrencyCode>,
    /// Smallest amount, in minor units.
    pub min_cents: i64,
    /// Largest amount, in minor units.
    pub max_cents: i64,
    /// How far back creation timestamps may go.
    pub days_back: i64,
    /// Fraction of transactions left pending; the rest are spread over
    /// verified, rejected and submitted.
    pub pending_share: f64,
    /// Fixed seed for reproducible queues.
    pub seed: Option<u64>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            size: 20,
            currencies: vec![CurrencyCode::new("USD")],
            min_cents: 10_000,
            max_cents: 5_000_000,
            days_back: 14,
            pending_share: 0.5,
            seed: None,
        }
    }
}

/// Generate a random review queue, newest first.
pub fn generate_review_queue(config: &QueueConfig) -> Vec<Transaction> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let now = Utc::now();
    let currencies = if config.currencies.is_empty() {
        vec![CurrencyCode::new("USD")]
    } else {
        config.currencies.clone()
    };
    let min = config.min_cents.max(1);
    let max = config.max_cents.max(min + 1);

    let mut queue: Vec<Transaction> = (0..config.size)
        .map(|i| {
            let name = BENEFICIARIES[rng.gen_range(0..BENEFICIARIES.len())];
            let (bank, country, swift) = BANKS[rng.gen_range(0..BANKS.len())];
            let currency = currencies[rng.gen_range(0..currencies.len())].clone();
            let amount = Decimal::new(rng.gen_range(min..max), 2);
            let age = Duration::minutes(rng.gen_range(0..(config.days_back.max(1) * 24 * 60)));
            let status = if rng.gen_bool(config.pending_share.clamp(0.0, 1.0)) {
                TransactionStatus::Pending
            } else {
                match rng.gen_range(0..3) {
                    0 => TransactionStatus::Verified,
                    1 => TransactionStatus::Rejected,
                    _ => TransactionStatus::Submitted,
                }
            };
            let account = format!("{}{:010}", country, rng.gen_range(0..10_000_000_000u64));

            Transaction::new(format!("TX-{:05}", i + 1), name, account, amount, currency)
                .with_bank(bank, country)
                .with_swift_code(swift)
                .with_status(status)
                .with_created_at(now - age)
        })
        .collect();

    queue.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    queue
}
