use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use settlement_review::core::currency::CurrencyCode;
use settlement_review::core::transaction::{Transaction, TransactionId, TransactionStatus};
use settlement_review::error::{ReviewError, ValidationError};
use settlement_review::review::{
    compute_visible_in, BatchSubmissionGate, FilterPredicate, ReviewState, SelectionSet,
    StatusFilter,
};

const NAMES: &[&str] = &[
    "Ama Mensah",
    "Kofi Boateng",
    "Amara Obi",
    "Lerato Dube",
    "PRIYA RAMAN",
    "Chen Wei",
];

fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    prop::sample::select(TransactionStatus::ALL.to_vec())
}

fn arb_status_filter() -> impl Strategy<Value = StatusFilter> {
    prop::sample::select(vec![
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Verified,
        StatusFilter::Rejected,
    ])
}

/// Creation times spread over five days, so the date clause bites.
fn arb_created_at() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..5 * 24 * 60).prop_map(|minutes| {
        Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    })
}

fn arb_transaction(index: usize) -> impl Strategy<Value = Transaction> {
    (
        prop::sample::select(NAMES.to_vec()),
        1u64..1_000_000u64,
        arb_status(),
        arb_created_at(),
    )
        .prop_map(move |(name, cents, status, created_at)| {
            Transaction::new(
                format!("TX-{:03}", index),
                name,
                "ACC-001",
                Decimal::new(cents as i64, 2),
                CurrencyCode::new("USD"),
            )
            .with_status(status)
            .with_created_at(created_at)
        })
}

/// A store of up to 30 transactions with unique ids.
fn arb_store() -> impl Strategy<Value = Vec<Transaction>> {
    (0usize..30).prop_flat_map(|n| (0..n).map(arb_transaction).collect::<Vec<_>>())
}

fn arb_predicate() -> impl Strategy<Value = FilterPredicate> {
    (
        arb_status_filter(),
        prop::option::of(0u32..6),
        prop::option::of(prop::sample::select(vec!["ama", "  OBI ", "", "wei", "zz"])),
    )
        .prop_map(|(status, day, text)| FilterPredicate {
            status,
            date: day.map(|d| NaiveDate::from_ymd_opt(2025, 11, 1 + d).unwrap()),
            beneficiary: text.map(str::to_string),
        })
}

fn arb_zone() -> impl Strategy<Value = FixedOffset> {
    (-12i32..=14).prop_map(|hours| FixedOffset::east_opt(hours * 3600).unwrap())
}

/// One clause at a time, independent of `matches_in`.
fn satisfies_all(tx: &Transaction, p: &FilterPredicate, tz: &FixedOffset) -> bool {
    let status_ok = match p.status {
        StatusFilter::All => true,
        StatusFilter::Pending => tx.status() == TransactionStatus::Pending,
        StatusFilter::Verified => tx.status() == TransactionStatus::Verified,
        StatusFilter::Rejected => tx.status() == TransactionStatus::Rejected,
    };
    let date_ok = p
        .date
        .map_or(true, |day| tx.created_at().with_timezone(tz).date_naive() == day);
    let name_ok = match p.beneficiary.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(text) => tx
            .beneficiary_name()
            .to_lowercase()
            .contains(&text.to_lowercase()),
    };
    status_ok && date_ok && name_ok
}

#[derive(Debug, Clone)]
enum Intent {
    Toggle(usize),
    SelectAll,
    Clear,
    SetPredicate(FilterPredicate),
    Refetch(Vec<usize>),
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        (0usize..30).prop_map(Intent::Toggle),
        Just(Intent::SelectAll),
        Just(Intent::Clear),
        arb_predicate().prop_map(Intent::SetPredicate),
        prop::collection::vec(0usize..30, 0..30).prop_map(Intent::Refetch),
    ]
}

proptest! {
    // ===================================================================
    // PROPERTY 1: The filter is sound and complete.
    //
    // Everything visible satisfies every clause; everything excluded
    // fails at least one. Store order is preserved.
    // ===================================================================
    #[test]
    fn filter_is_sound_and_complete(
        store in arb_store(),
        predicate in arb_predicate(),
        zone in arb_zone(),
    ) {
        let visible = compute_visible_in(&store, &predicate, &zone);
        let expected: Vec<&Transaction> = store
            .iter()
            .filter(|t| satisfies_all(t, &predicate, &zone))
            .collect();
        prop_assert_eq!(visible, expected);
    }

    // ===================================================================
    // PROPERTY 2: The selection never leaves the visible set.
    //
    // Whatever mix of toggles, select-alls, filter changes and refetches
    // arrives, the selection stays a subset of what is on screen.
    // ===================================================================
    #[test]
    fn selection_stays_within_visible_set(
        store in arb_store(),
        intents in prop::collection::vec(arb_intent(), 1..40),
    ) {
        let mut state = ReviewState::with_zone(FixedOffset::east_opt(0).unwrap());
        state.replace_transactions(store.clone());

        for intent in intents {
            match intent {
                Intent::Toggle(i) => {
                    state.toggle(&TransactionId::new(format!("TX-{:03}", i)));
                }
                Intent::SelectAll => state.select_all(),
                Intent::Clear => state.clear_selection(),
                Intent::SetPredicate(p) => state.set_predicate(p),
                Intent::Refetch(keep) => {
                    let subset = store
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| keep.contains(i))
                        .map(|(_, t)| t.clone())
                        .collect();
                    state.replace_transactions(subset);
                }
            }
            let visible = state.visible_ids();
            prop_assert!(
                state.selection().is_subset_of(&visible),
                "selection {:?} escaped visible set {:?}",
                state.selection().iter().collect::<Vec<_>>(),
                visible
            );
        }
    }

    // ===================================================================
    // PROPERTY 3: Select-all twice is the identity.
    //
    // With a non-empty, unchanged visible set, two select-alls restore
    // the starting selection unless it was already everything.
    // ===================================================================
    #[test]
    fn select_all_is_involutive(
        ids in prop::collection::btree_set("[a-z]{1,4}", 1..20),
        start in prop::collection::vec(any::<bool>(), 20),
    ) {
        let visible: Vec<TransactionId> = ids.iter().map(TransactionId::new).collect();
        let mut selection = SelectionSet::new();
        for (id, pick) in visible.iter().zip(&start) {
            if *pick {
                selection.toggle(id);
            }
        }
        let was_everything = selection.equals(&visible);

        selection.select_all(&visible);
        if was_everything {
            prop_assert!(selection.is_empty());
        } else {
            prop_assert!(selection.equals(&visible));
        }
        selection.select_all(&visible);
        if was_everything {
            prop_assert!(selection.equals(&visible));
        } else {
            prop_assert!(selection.is_empty());
        }
    }

    // ===================================================================
    // PROPERTY 4: Only all-verified selections pass the batch gate.
    //
    // Any non-verified member fails with MixedStatus carrying the exact
    // count of ineligible members.
    // ===================================================================
    #[test]
    fn batch_gate_requires_all_verified(
        store in arb_store(),
        picks in prop::collection::vec(any::<bool>(), 30),
    ) {
        let mut selection = SelectionSet::new();
        for (tx, pick) in store.iter().zip(&picks) {
            if *pick {
                selection.toggle(tx.id());
            }
        }
        let chosen: Vec<&Transaction> = store.iter().filter(|t| selection.contains(t.id())).collect();
        let ineligible = chosen
            .iter()
            .filter(|t| t.status() != TransactionStatus::Verified)
            .count();

        match BatchSubmissionGate::validate(&selection, &store) {
            Ok(plan) => {
                prop_assert!(!chosen.is_empty());
                prop_assert_eq!(ineligible, 0);
                let expected: Vec<TransactionId> = chosen.iter().map(|t| t.id().clone()).collect();
                prop_assert_eq!(plan.ids(), expected.as_slice());
            }
            Err(ReviewError::Validation(ValidationError::EmptySelection)) => {
                prop_assert!(chosen.is_empty());
            }
            Err(ReviewError::Validation(ValidationError::MixedStatus { ineligible: n })) => {
                prop_assert!(ineligible > 0);
                prop_assert_eq!(n, ineligible);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
