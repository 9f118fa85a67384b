// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::notify::Notifier;
use crate::runner;
use crate::snapshot::SnapshotSink;

/// Run immediately, then every `interval`. Each tick is an independent run.
pub fn spawn_interval(
    cfg: Arc<AppConfig>,
    notifier: Arc<dyn Notifier>,
    sink: Option<Arc<dyn SnapshotSink>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let ok = runner::run_guarded(&cfg, notifier.as_ref(), sink.as_deref()).await;
            tracing::info!(
                target: "scheduler",
                delivered = ok,
                next_in_secs = interval.as_secs(),
                "scheduled run finished"
            );
        }
    })
}

pub fn interval_from_hours(hours: u64) -> Duration {
    Duration::from_secs(hours.max(1) * 3600)
}
