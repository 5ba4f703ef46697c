// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tokio::task::JoinHandle;

use crate::checker::Checker;
use crate::store::MonitoringStore;

#[derive(Clone, Copy, Debug)]
pub struct WatchSchedulerCfg {
    pub startup_delay: Duration,
    pub interval: Duration,
}

impl Default for WatchSchedulerCfg {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(5),
            interval: Duration::from_secs(30),
        }
    }
}

/// One-time metrics registration (so series are described wherever the
/// embedder installs a recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("watch_rounds_total", "Completed scheduler rounds.");
        describe_counter!("watch_checks_total", "Monitoring checks attempted.");
        describe_counter!("watch_check_errors_total", "Checks that failed with an error.");
        describe_counter!(
            "watch_checks_unresolved_total",
            "Checks whose source could not be resolved."
        );
        describe_counter!("watch_occurrences_total", "Keyword occurrences detected.");
        describe_gauge!("watch_last_round_ts", "Unix ts when the last round finished.");
    });
}

/// One full pass over every active entry, sequentially. A failing check is
/// logged and never aborts its siblings. Returns how many checks completed.
pub async fn run_round(store: &dyn MonitoringStore, checker: &Checker) -> usize {
    ensure_metrics_described();

    let entries = match store.list_active().await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = ?e, "could not list active monitorings");
            return 0;
        }
    };

    let mut checked = 0usize;
    for entry in &entries {
        counter!("watch_checks_total").increment(1);
        match checker.run_check(&entry.id).await {
            Ok(result) => {
                checked += 1;
                tracing::debug!(
                    entry = %entry.id,
                    changed = result.content_changed,
                    matched = result.matched,
                    "check finished"
                );
            }
            Err(e) => {
                counter!("watch_check_errors_total").increment(1);
                tracing::warn!(entry = %entry.id, error = ?e, "check failed");
            }
        }
    }

    counter!("watch_rounds_total").increment(1);
    gauge!("watch_last_round_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    checked
}

/// Spawn the background poll loop: short startup delay, then one round per
/// fixed interval, forever. This is the process's heartbeat; nothing inside
/// a round can terminate it.
pub fn spawn_watch_scheduler(
    cfg: WatchSchedulerCfg,
    store: Arc<dyn MonitoringStore>,
    checker: Arc<Checker>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(cfg.startup_delay).await;
        let mut ticker = tokio::time::interval(cfg.interval);
        loop {
            ticker.tick().await;
            let checked = run_round(store.as_ref(), checker.as_ref()).await;
            tracing::info!(target: "scheduler", checked, "watch round finished");
        }
    })
}
