//! One-shot check driver: runs a single monitoring check against a gazette
//! URL and prints the result. Same pipeline the scheduler runs, on demand.
//!
//! Usage: check-once <gazette-url> <edital-identifier> [candidate-name]

use std::sync::Arc;
use std::time::Duration;

use edital_watch::checker::Checker;
use edital_watch::extract::PdfTextExtractor;
use edital_watch::monitoring::MonitoringEntry;
use edital_watch::notify::NotifierMux;
use edital_watch::resolver::HttpResolver;
use edital_watch::store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let _ = dotenvy::dotenv();

    let mut args = std::env::args().skip(1);
    let (Some(url), Some(edital)) = (args.next(), args.next()) else {
        eprintln!("usage: check-once <gazette-url> <edital-identifier> [candidate-name]");
        std::process::exit(2);
    };

    let entry = match args.next() {
        Some(name) => MonitoringEntry::personal("check-once", &url, &edital, &name, "dev@localhost"),
        None => MonitoringEntry::radar("check-once", &url, &edital, "dev@localhost"),
    };

    let store = Arc::new(MemoryStore::new());
    store.insert(entry).await;

    let resolver = Arc::new(HttpResolver::new(Duration::from_secs(20))?);
    let checker = Checker::new(
        resolver,
        Arc::new(PdfTextExtractor),
        store,
        Arc::new(NotifierMux::from_env()),
    );

    let result = checker.run_check("check-once").await?;
    println!("changed: {}", result.content_changed);
    println!("matched: {}", result.matched);
    for kw in result.matched_keywords {
        println!("  - {kw}");
    }
    Ok(())
}
