//! Fetch the hot list and write the JSON snapshot for the static page.
//! No chat notification is sent.

use std::path::Path;
use std::process::ExitCode;

use chrono::Local;
use hot_list_relay::config;
use hot_list_relay::runner::Pipeline;
use hot_list_relay::snapshot::{JsonFileSink, Snapshot, SnapshotSink};
use hot_list_relay::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = config::load();
    let pipeline = match Pipeline::from_config(&cfg) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "cannot build pipeline");
            return ExitCode::FAILURE;
        }
    };

    let outcome = pipeline.fetch().await;
    for r in outcome.records.iter().take(3) {
        tracing::info!(rank = r.rank, word = %r.display_text, hot_value = %r.popularity, "preview");
    }

    let snapshot = Snapshot::from_outcome(&outcome, pipeline.category(), Local::now().naive_local());
    let sink = JsonFileSink::new(Path::new(&cfg.snapshot.path));
    match sink.store(&snapshot).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "snapshot write failed");
            ExitCode::FAILURE
        }
    }
}
