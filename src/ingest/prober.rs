// src/ingest/prober.rs
//! Ordered multi-source probing.
//!
//! Sources are tried one at a time in list order. The first source that yields
//! a non-empty record set wins and no further sources are contacted. When every
//! source fails, the fixed synthetic set is returned with `degraded = true`.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;

use crate::ingest::error::ProbeError;
use crate::ingest::extract;
use crate::ingest::fallback;
use crate::ingest::shape;
use crate::ingest::types::{FetchOutcome, Record, SourceDescriptor};

pub const UNKNOWN_SOURCE_NAME: &str = "未知来源";

/// URL keyword → display name, used when the final URL matches no descriptor.
/// More specific fragments come first.
const URL_NAME_HINTS: [(&str, &str); 4] = [
    ("hotsearch/billboard/word", "抖音热搜榜(旧版)"),
    ("hot/search", "抖音热搜榜"),
    ("star", "明星榜"),
    ("music", "音乐榜"),
];

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("probe_attempts_total", "Source requests attempted.");
        describe_counter!(
            "probe_failures_total",
            "Source attempts that failed, labelled by kind."
        );
        describe_counter!("probe_success_total", "Probe runs served by a live source.");
        describe_counter!(
            "probe_degraded_total",
            "Probe runs that fell back to the synthetic set."
        );
        describe_histogram!("probe_fetch_ms", "Per-source fetch+parse time in milliseconds.");
    });
}

/// Everything the prober needs; built once from the application config.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub sources: Vec<SourceDescriptor>,
    pub limit: usize,
    pub timeout: Duration,
    pub headers: BTreeMap<String, String>,
    /// Optional cap across all attempts of one run.
    pub total_budget: Option<Duration>,
}

impl ProbeSettings {
    pub fn new(sources: Vec<SourceDescriptor>, limit: usize, timeout: Duration) -> Self {
        Self {
            sources,
            limit,
            timeout,
            headers: BTreeMap::new(),
            total_budget: None,
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_total_budget(mut self, budget: Duration) -> Self {
        self.total_budget = Some(budget);
        self
    }
}

pub struct SourceProber {
    settings: ProbeSettings,
    client: Client,
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name `{k}`"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid value for header `{k}`"))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Truncate to `limit` and extract; ranks are the 1-based positions.
pub fn records_from_items(items: &[Value], limit: usize) -> Result<Vec<Record>, ProbeError> {
    let records = items
        .iter()
        .take(limit)
        .enumerate()
        .map(|(idx, item)| {
            let rank = idx + 1;
            item.as_object()
                .map(|obj| extract::extract(obj, rank as u32))
                .ok_or(ProbeError::MalformedItem(rank))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(ProbeError::EmptyResult);
    }
    Ok(records)
}

fn declared_name<'a>(url: &str, sources: &'a [SourceDescriptor]) -> Option<&'a str> {
    sources
        .iter()
        .find(|s| s.url == url)
        .map(|s| s.display_name.trim())
        .filter(|name| !name.is_empty())
}

fn hinted_name(url: &str) -> Option<&'static str> {
    URL_NAME_HINTS
        .iter()
        .find(|(needle, _)| url.contains(needle))
        .map(|(_, name)| *name)
}

/// Display name for a single URL.
///
/// Exact descriptor URL first, then a keyword heuristic, then the unknown marker.
pub fn identify_source(url: &str, sources: &[SourceDescriptor]) -> String {
    declared_name(url, sources)
        .or_else(|| hinted_name(url))
        .unwrap_or(UNKNOWN_SOURCE_NAME)
        .to_string()
}

/// Display name for a successful attempt.
///
/// `requested` is the configured URL as written; `answered` is the URL the
/// client reports after normalisation and redirects. Declared names beat
/// keyword hints, and the requested URL beats the answered one.
pub fn name_for_attempt(requested: &str, answered: &str, sources: &[SourceDescriptor]) -> String {
    declared_name(requested, sources)
        .or_else(|| declared_name(answered, sources))
        .or_else(|| hinted_name(answered))
        .or_else(|| hinted_name(requested))
        .unwrap_or(UNKNOWN_SOURCE_NAME)
        .to_string()
}

impl SourceProber {
    pub fn new(settings: ProbeSettings) -> Result<Self> {
        let client = Client::builder()
            .default_headers(header_map(&settings.headers)?)
            .build()
            .context("building probe http client")?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Run one probe pass. Never fails: exhaustion yields the degraded outcome.
    pub async fn probe(&self) -> FetchOutcome {
        ensure_metrics_described();
        let started = Instant::now();

        for source in &self.settings.sources {
            let timeout = match self.settings.total_budget {
                Some(budget) => {
                    let remaining = budget.saturating_sub(started.elapsed());
                    if remaining.is_zero() {
                        tracing::warn!(
                            budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                            "probe budget exhausted, skipping remaining sources"
                        );
                        break;
                    }
                    self.settings.timeout.min(remaining)
                }
                None => self.settings.timeout,
            };

            tracing::info!(url = %source.url, kind = %source.declared_kind, "trying source");
            counter!("probe_attempts_total").increment(1);

            let t0 = Instant::now();
            let result = self.try_source(source, timeout).await;
            histogram!("probe_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

            match result {
                Ok((records, final_url)) => {
                    let source_name =
                        name_for_attempt(&source.url, &final_url, &self.settings.sources);
                    tracing::info!(
                        count = records.len(),
                        source = %source_name,
                        url = %final_url,
                        "hot list fetched"
                    );
                    counter!("probe_success_total").increment(1);
                    return FetchOutcome {
                        records,
                        source_name,
                        degraded: false,
                    };
                }
                Err(e) => {
                    tracing::warn!(url = %source.url, kind = e.kind(), error = %e, "source failed");
                    counter!("probe_failures_total", "kind" => e.kind()).increment(1);
                }
            }
        }

        tracing::warn!(
            sources = self.settings.sources.len(),
            "no source produced data, using synthetic hot list"
        );
        counter!("probe_degraded_total").increment(1);
        fallback::degraded_outcome(self.settings.limit)
    }

    async fn try_source(
        &self,
        source: &SourceDescriptor,
        timeout: Duration,
    ) -> Result<(Vec<Record>, String), ProbeError> {
        let resp = self.client.get(&source.url).timeout(timeout).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeError::BadStatus(status));
        }
        let final_url = resp.url().to_string();
        let body = resp.bytes().await?;

        let data: Value = serde_json::from_slice(&body)?;
        if let Some(obj) = data.as_object() {
            tracing::debug!(keys = ?obj.keys().collect::<Vec<_>>(), "response top-level keys");
        }

        let (shape, items) = shape::resolve(&data).ok_or(ProbeError::ShapeUnrecognized)?;
        tracing::debug!(shape = %shape.describe(), items = items.len(), "response shape resolved");

        let records = records_from_items(items, self.settings.limit)?;
        Ok((records, final_url))
    }
}
