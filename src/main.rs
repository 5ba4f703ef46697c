//! Edital Watch — binary entrypoint.
//! Seeds the monitoring store and runs the background watch scheduler.
//!
//! See `README.md` for quickstart.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use edital_watch::checker::Checker;
use edital_watch::config::{self, WatchConfig};
use edital_watch::extract::PdfTextExtractor;
use edital_watch::notify::NotifierMux;
use edital_watch::resolver::HttpResolver;
use edital_watch::scheduler::{spawn_watch_scheduler, WatchSchedulerCfg};
use edital_watch::store::MemoryStore;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("edital_watch=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = WatchConfig::from_env();

    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(NotifierMux::from_env());
    let resolver = Arc::new(HttpResolver::new(cfg.request_timeout)?);
    let checker = Arc::new(Checker::new(
        resolver,
        Arc::new(PdfTextExtractor),
        store.clone(),
        notifier,
    ));

    let seeded = config::load_monitorings_default()?;
    tracing::info!(count = seeded.len(), "seeding monitorings");
    for entry in seeded {
        store.insert(entry.clone()).await;
        if entry.is_active() {
            checker.announce_activation(&entry).await;
        }
    }

    let sched_cfg = WatchSchedulerCfg {
        startup_delay: cfg.startup_delay,
        interval: cfg.interval,
    };
    let handle = spawn_watch_scheduler(sched_cfg, store, checker);
    tracing::info!("watch scheduler started");

    handle.await?;
    Ok(())
}
