//! settlement-review CLI
//!
//! Work a transaction review queue from the command line.
//!
//! # Usage
//!
//! ```bash
//! # List verified transactions for one beneficiary
//! settlement-review list --input queue.json --status verified --beneficiary mensah
//!
//! # Dashboard counts
//! settlement-review summary --input queue.json
//!
//! # Settle every verified transaction created on a given day
//! settlement-review settle --input queue.json --date 2025-11-02 --output settled.json
//!
//! # Generate a random queue for testing
//! settlement-review generate --count 40 --currencies USD,ZAR,NGN
//! ```

use chrono::NaiveDate;
use settlement_review::backend::InMemoryBackend;
use settlement_review::config::ReviewConfig;
use settlement_review::core::currency::CurrencyCode;
use settlement_review::core::transaction::Transaction;
use settlement_review::core::user::{CurrentUser, Role, StaticSession};
use settlement_review::dashboard::DashboardSummary;
use settlement_review::review::{FilterPredicate, ReviewWorkspace, StatusFilter};
use settlement_review::simulation::generator::{generate_review_queue, QueueConfig};
use std::collections::HashMap;
use std::fs;
use std::process;
use std::sync::Arc;

fn print_usage() {
    eprintln!(
        r#"settlement-review — review and batch-settle cross-border payments

USAGE:
    settlement-review <COMMAND> [OPTIONS]

COMMANDS:
    list        Show transactions matching a filter
    summary     Show dashboard counts and the pending preview
    settle      Submit every verified transaction matching a filter
    generate    Generate a random review queue (for testing)
    help        Show this message

OPTIONS (list, summary, settle):
    --input <FILE>          Path to JSON transactions file
    --config <FILE>         Path to JSON review config
    --format <FORMAT>       Output format: text (default) or json

OPTIONS (list, settle):
    --status <STATUS>       all (default), pending, verified, rejected  [list only]
    --date <YYYY-MM-DD>     Creation day
    --beneficiary <TEXT>    Beneficiary name contains TEXT
    --output <FILE>         Write the refreshed queue here  [settle only]

OPTIONS (generate):
    --count <N>             Number of transactions (default: 20)
    --currencies <LIST>     Comma-separated currency codes (default: USD)
    --seed <N>              Fixed random seed
    --output <FILE>         Write to file instead of stdout

EXAMPLES:
    settlement-review list --input queue.json --status pending
    settlement-review summary --input queue.json --format json
    settlement-review settle --input queue.json --beneficiary obi
    settlement-review generate --count 40 --currencies USD,ZAR --output queue.json"#
    );
}

/// Accepts either `{"transactions": [...]}` or a bare array.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum TransactionsFile {
    Wrapped { transactions: Vec<Transaction> },
    Bare(Vec<Transaction>),
}

#[derive(serde::Serialize)]
struct TransactionsOutput<'a> {
    transactions: &'a [Transaction],
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Parse `--flag value` pairs, rejecting flags not in `allowed`.
fn parse_options(args: &[String], allowed: &[&str]) -> HashMap<String, String> {
    let mut options = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if !allowed.contains(&flag) {
            fail(format!("unknown option: {}", flag));
        }
        i += 1;
        let value = args
            .get(i)
            .cloned()
            .unwrap_or_else(|| fail(format!("{} requires a value", flag)));
        options.insert(flag.trim_start_matches("--").to_string(), value);
        i += 1;
    }
    options
}

fn load_transactions(path: &str) -> Vec<Transaction> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));
    match serde_json::from_str::<TransactionsFile>(&content) {
        Ok(TransactionsFile::Wrapped { transactions }) | Ok(TransactionsFile::Bare(transactions)) => {
            transactions
        }
        Err(e) => fail(format!("parsing transactions JSON: {}", e)),
    }
}

fn load_config(options: &HashMap<String, String>) -> ReviewConfig {
    match options.get("config") {
        Some(path) => ReviewConfig::from_file(path).unwrap_or_else(|e| fail(e)),
        None => ReviewConfig::default(),
    }
}

fn predicate_from(options: &HashMap<String, String>) -> FilterPredicate {
    let mut predicate = FilterPredicate::new();
    if let Some(status) = options.get("status") {
        predicate.status = status.parse::<StatusFilter>().unwrap_or_else(|e| fail(e));
    }
    if let Some(date) = options.get("date") {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap_or_else(|e| fail(format!("invalid --date '{}': {}", date, e)));
        predicate.date = Some(day);
    }
    predicate.beneficiary = options.get("beneficiary").cloned();
    predicate
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(format!("serialising output: {}", e)))
}

fn print_table(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }
    for t in transactions {
        println!(
            "{:<10} {:<10} {:<22} {:>14} {}  {}",
            t.id(),
            t.status(),
            t.beneficiary_name(),
            t.amount(),
            t.currency(),
            t.created_at().format("%Y-%m-%d %H:%M")
        );
    }
    println!("\n{} transaction(s)", transactions.len());
}

fn reviewer() -> StaticSession {
    StaticSession::signed_in(CurrentUser::new("cli", "CLI reviewer", Role::Employee))
}

async fn open_workspace(path: &str, config: ReviewConfig) -> (Arc<InMemoryBackend>, ReviewWorkspace) {
    let backend = Arc::new(InMemoryBackend::new(load_transactions(path)));
    let workspace = ReviewWorkspace::mount(&reviewer(), backend.clone(), config)
        .await
        .unwrap_or_else(|e| fail(e));
    (backend, workspace)
}

async fn cmd_list(args: &[String]) {
    let options = parse_options(
        args,
        &["--input", "--config", "--format", "--status", "--date", "--beneficiary"],
    );
    let path = options
        .get("input")
        .cloned()
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let (_, workspace) = open_workspace(&path, load_config(&options)).await;
    workspace.set_predicate(predicate_from(&options)).await;
    let view = workspace.view().await;

    match options.get("format").map(String::as_str) {
        Some("json") => println!("{}", to_json(&TransactionsOutput { transactions: &view.visible })),
        _ => print_table(&view.visible),
    }
}

fn cmd_summary(args: &[String]) {
    let options = parse_options(args, &["--input", "--config", "--format"]);
    let path = options
        .get("input")
        .cloned()
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let config = load_config(&options);
    let transactions = load_transactions(&path);
    let summary = DashboardSummary::from_transactions(&transactions, config.pending_preview_limit);

    match options.get("format").map(String::as_str) {
        Some("json") => println!("{}", to_json(&summary)),
        _ => print!("{}", summary),
    }
}

async fn cmd_settle(args: &[String]) {
    let options = parse_options(
        args,
        &["--input", "--config", "--format", "--date", "--beneficiary", "--output"],
    );
    let path = options
        .get("input")
        .cloned()
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let config = load_config(&options);
    let network = config.settlement_network.clone();
    let (backend, workspace) = open_workspace(&path, config).await;

    let predicate = predicate_from(&options).with_status(StatusFilter::Verified);
    workspace.set_predicate(predicate).await;
    workspace.select_all().await;

    let receipt = workspace.submit().await.unwrap_or_else(|e| fail(e));

    match options.get("format").map(String::as_str) {
        Some("json") => println!("{}", to_json(&receipt)),
        _ => {
            println!(
                "Successfully submitted {} transaction(s) to {}.",
                receipt.submitted_count, network
            );
            for id in &receipt.ids {
                println!("  {}", id);
            }
        }
    }

    if let Some(output) = options.get("output") {
        let refreshed = backend.snapshot().await;
        let json = to_json(&TransactionsOutput {
            transactions: &refreshed,
        });
        fs::write(output, json).unwrap_or_else(|e| fail(format!("writing '{}': {}", output, e)));
        eprintln!("Wrote {} transaction(s) → {}", refreshed.len(), output);
    }
}

fn cmd_generate(args: &[String]) {
    let options = parse_options(args, &["--count", "--currencies", "--seed", "--output"]);
    let mut config = QueueConfig::default();
    if let Some(count) = options.get("count") {
        config.size = count
            .parse()
            .unwrap_or_else(|_| fail("--count requires a number"));
    }
    if let Some(list) = options.get("currencies") {
        config.currencies = list.split(',').map(|s| CurrencyCode::new(s.trim())).collect();
    }
    if let Some(seed) = options.get("seed") {
        config.seed = Some(seed.parse().unwrap_or_else(|_| fail("--seed requires a number")));
    }

    let queue = generate_review_queue(&config);
    let json = to_json(&TransactionsOutput { transactions: &queue });

    if let Some(path) = options.get("output") {
        fs::write(path, &json).unwrap_or_else(|e| fail(format!("writing '{}': {}", path, e)));
        eprintln!("Generated {} transaction(s) → {}", queue.len(), path);
    } else {
        println!("{}", json);
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "list" => cmd_list(rest).await,
        "summary" => cmd_summary(rest),
        "settle" => cmd_settle(rest).await,
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
