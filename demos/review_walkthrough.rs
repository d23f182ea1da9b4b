//! Review walkthrough.
//!
//! A reviewer approves one pending transaction, rejects another, and
//! settles every verified transaction in a single batch.

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use settlement_review::prelude::*;
use std::sync::Arc;

fn print_queue(view: &settlement_review::review::ReviewView) {
    for t in &view.visible {
        let tick = if view.is_selected(t.id()) { "[x]" } else { "[ ]" };
        println!(
            "  {} {:<4} {:<10} {:<16} {:>12} {}",
            tick,
            t.id(),
            t.status(),
            t.beneficiary_name(),
            t.amount(),
            t.currency()
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), ReviewError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔════════════════════════════════════════════╗");
    println!("║  settlement-review: Review Walkthrough     ║");
    println!("╚════════════════════════════════════════════╝\n");

    let created = Utc.with_ymd_and_hms(2025, 11, 2, 9, 30, 0).unwrap();
    let usd = CurrencyCode::new("USD");
    let backend = Arc::new(InMemoryBackend::new(vec![
        Transaction::new("1", "Ama Mensah", "GH0012345678", dec!(2_500.00), usd.clone())
            .with_bank("GCB Bank", "GH")
            .with_swift_code("GHCBGHAC")
            .with_created_at(created),
        Transaction::new("2", "Kofi Boateng", "GH0098765432", dec!(18_000.00), usd.clone())
            .with_bank("GCB Bank", "GH")
            .with_status(TransactionStatus::Verified)
            .with_created_at(created),
        Transaction::new("3", "Amara Obi", "NG0055511122", dec!(740.50), usd.clone())
            .with_bank("Access Bank", "NG")
            .with_status(TransactionStatus::Rejected)
            .with_created_at(created),
        Transaction::new("4", "Lerato Dube", "ZA0044433322", dec!(9_999.99), usd)
            .with_bank("Standard Bank", "ZA")
            .with_created_at(created),
    ]));

    let session = StaticSession::signed_in(CurrentUser::new("emp-7", "Naledi", Role::Employee));
    let workspace = ReviewWorkspace::mount(&session, backend.clone(), ReviewConfig::default()).await?;

    // --- Step 1: Dashboard ---
    println!("━━━ Step 1: Dashboard ━━━\n");
    {
        let state = workspace.state().await;
        let summary = DashboardSummary::from_transactions(state.transactions(), 5);
        println!("{}", summary);
    }

    // --- Step 2: Work the pending queue ---
    println!("━━━ Step 2: Pending Review ━━━\n");
    workspace.set_status_filter(StatusFilter::Pending).await;
    print_queue(&workspace.view().await);

    let details = workspace.open_details(&TransactionId::new("1")).await;
    if let Some(t) = details.transaction() {
        println!(
            "  Details: {} at {} ({}), SWIFT {}",
            t.beneficiary_name(),
            t.bank_name(),
            t.bank_country(),
            t.swift_code().unwrap_or("-")
        );
    }

    let outcome = workspace.approve(&TransactionId::new("1"), None).await?;
    println!("  Approve 1:  {:?}", outcome);

    match workspace.reject(&TransactionId::new("4"), "   ").await {
        Err(err) => println!("  Reject 4 with a blank reason: {} [{}]", err, err.error_code()),
        Ok(outcome) => println!("  Reject 4: {:?}", outcome),
    }
    let outcome = workspace
        .reject(&TransactionId::new("4"), "Beneficiary account could not be confirmed")
        .await?;
    println!("  Reject 4:   {:?}\n", outcome);

    // --- Step 3: Mixed selections are refused ---
    println!("━━━ Step 3: Batch Gate ━━━\n");
    workspace.set_status_filter(StatusFilter::All).await;
    workspace.toggle(&TransactionId::new("2")).await;
    workspace.toggle(&TransactionId::new("3")).await;
    print_queue(&workspace.view().await);
    if let Err(err) = workspace.submit().await {
        println!("  Submit refused: {}\n", err);
    }
    workspace.clear_selection().await;

    // --- Step 4: Settle every verified transaction ---
    println!("━━━ Step 4: Settlement ━━━\n");
    workspace.set_status_filter(StatusFilter::Verified).await;
    workspace.select_all().await;
    print_queue(&workspace.view().await);

    let receipt = workspace.submit().await?;
    println!(
        "  Successfully submitted {} transaction(s) to {}.",
        receipt.submitted_count,
        workspace.config().settlement_network
    );
    println!("  Backend calls: {:?}\n", backend.calls().await);

    println!("━━━ Final Queue ━━━\n");
    workspace.set_status_filter(StatusFilter::All).await;
    for t in &workspace.view().await.visible {
        println!(
            "  {:<4} {:<10} {}",
            t.id(),
            t.status(),
            t.settlement_reference().unwrap_or("")
        );
    }

    workspace.close().await;
    Ok(())
}
