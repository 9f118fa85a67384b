//! Single run for CI / cron: fetch, deliver, exit non-zero on failure.

use std::process::ExitCode;

use hot_list_relay::config;
use hot_list_relay::notify::FeishuNotifier;
use hot_list_relay::runner;
use hot_list_relay::snapshot::{JsonFileSink, SnapshotSink};
use hot_list_relay::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = config::load();
    let Some(webhook) = cfg.webhook_url.clone() else {
        tracing::error!("FEISHU_WEBHOOK_URL is not configured");
        return ExitCode::FAILURE;
    };

    let notifier = FeishuNotifier::new(webhook);
    let sink = cfg
        .snapshot
        .enabled
        .then(|| JsonFileSink::new(&cfg.snapshot.path));

    let ok = runner::run_guarded(
        &cfg,
        &notifier,
        sink.as_ref().map(|s| s as &dyn SnapshotSink),
    )
    .await;

    if ok {
        tracing::info!("run finished");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
