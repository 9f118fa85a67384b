//! One invocation of the whole pipeline: probe → filter → deliver → snapshot.

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::AppConfig;
use crate::format::Formatter;
use crate::ingest::category;
use crate::ingest::prober::SourceProber;
use crate::ingest::types::FetchOutcome;
use crate::notify::{self, Notifier};
use crate::snapshot::{Snapshot, SnapshotSink};

/// Explicitly configured prober + formatter for one category.
pub struct Pipeline {
    prober: SourceProber,
    formatter: Formatter,
    category: String,
    /// `None` when the category is unknown or disabled: records pass unfiltered.
    keywords: Option<Vec<String>>,
}

impl Pipeline {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        cfg.validate().context("invalid configuration")?;
        let category = cfg.run_category();
        let keywords = cfg.category_keywords(&category).map(<[String]>::to_vec);
        if keywords.is_none() {
            tracing::warn!(category = %category, "category not found or disabled, records will not be filtered");
        }
        Ok(Self {
            prober: SourceProber::new(cfg.probe_settings())?,
            formatter: Formatter::new(cfg.display_settings(&category)),
            category,
            keywords,
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Probe and apply the category filter. Ranks keep their pre-filter values.
    pub async fn fetch(&self) -> FetchOutcome {
        let outcome = self.prober.probe().await;
        let Some(keywords) = &self.keywords else {
            return outcome;
        };
        let before = outcome.records.len();
        let kept = category::filter(outcome.records.clone(), keywords);
        tracing::info!(
            category = %self.category,
            kept = kept.len(),
            total = before,
            "category filter applied"
        );
        outcome.with_records(kept)
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: FetchOutcome,
    pub category: String,
    pub delivered: bool,
}

fn log_preview(outcome: &FetchOutcome) {
    for r in outcome.records.iter().take(3) {
        tracing::info!(rank = r.rank, word = %r.display_text, hot_value = %r.popularity, "preview");
    }
}

/// Fetch, deliver and optionally persist. Delivery failure is reported through
/// `RunReport::delivered`; only setup problems surface as errors.
pub async fn run_once(
    cfg: &AppConfig,
    notifier: &dyn Notifier,
    sink: Option<&dyn SnapshotSink>,
) -> Result<RunReport> {
    let pipeline = Pipeline::from_config(cfg)?;
    tracing::info!(
        category = %pipeline.category(),
        limit = cfg.scraper.limit,
        "starting hot list run"
    );

    let outcome = pipeline.fetch().await;
    if outcome.degraded {
        tracing::warn!("all sources failed, delivering synthetic data");
    }
    log_preview(&outcome);

    let delivered = notify::deliver(notifier, &outcome, pipeline.formatter()).await;
    if delivered {
        tracing::info!("hot list delivered");
    } else {
        tracing::error!("hot list delivery failed");
    }

    if let Some(sink) = sink {
        let snapshot = Snapshot::from_outcome(&outcome, pipeline.category(), Local::now().naive_local());
        if let Err(e) = sink.store(&snapshot).await {
            tracing::warn!(error = %format!("{e:#}"), "snapshot not saved");
        }
    }

    Ok(RunReport {
        outcome,
        category: pipeline.category().to_string(),
        delivered,
    })
}

/// Catch-all wrapper: any error is logged and reported to the chat as a
/// best-effort text notice. Returns whether the run delivered its message.
pub async fn run_guarded(
    cfg: &AppConfig,
    notifier: &dyn Notifier,
    sink: Option<&dyn SnapshotSink>,
) -> bool {
    match run_once(cfg, notifier, sink).await {
        Ok(report) => report.delivered,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "hot list run failed");
            notify::notify_failure(notifier, &e).await;
            false
        }
    }
}
