//! Hot list relay service.
//! Runs once at startup, then on a fixed interval until Ctrl+C.

use std::sync::Arc;

use hot_list_relay::config;
use hot_list_relay::notify::{FeishuNotifier, Notifier};
use hot_list_relay::scheduler;
use hot_list_relay::snapshot::{JsonFileSink, SnapshotSink};
use hot_list_relay::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = config::load();
    let Some(webhook) = cfg.webhook_url.clone() else {
        tracing::error!("FEISHU_WEBHOOK_URL is not configured; copy .env.example to .env and set it");
        anyhow::bail!("missing FEISHU_WEBHOOK_URL");
    };
    cfg.validate()?;

    let interval = scheduler::interval_from_hours(cfg.schedule.interval_hours);
    tracing::info!(
        interval_hours = cfg.schedule.interval_hours,
        category = %cfg.run_category(),
        sources = cfg.source_descriptors().len(),
        "hot list relay starting"
    );

    let notifier: Arc<dyn Notifier> = Arc::new(FeishuNotifier::new(webhook));
    let sink: Option<Arc<dyn SnapshotSink>> = cfg
        .snapshot
        .enabled
        .then(|| Arc::new(JsonFileSink::new(&cfg.snapshot.path)) as Arc<dyn SnapshotSink>);

    let handle = scheduler::spawn_interval(Arc::new(cfg), notifier, sink, interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    handle.abort();
    Ok(())
}
