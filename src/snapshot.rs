//! JSON snapshot of the latest hot list, consumed by the static web page.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::format::TIMESTAMP_FORMAT;
use crate::ingest::types::{FetchOutcome, Record};

pub const DEFAULT_SNAPSHOT_PATH: &str = "docs/data/hot_list.json";

/// Field order is the on-disk key order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub hot_list: Vec<Record>,
    pub update_time: String,
    pub source: String,
    pub category: String,
    #[serde(default)]
    pub is_test_data: bool,
}

impl Snapshot {
    pub fn from_outcome(outcome: &FetchOutcome, category: &str, at: NaiveDateTime) -> Self {
        Self {
            hot_list: outcome.records.clone(),
            update_time: at.format(TIMESTAMP_FORMAT).to_string(),
            source: outcome.source_name.clone(),
            category: category.to_string(),
            is_test_data: outcome.degraded,
        }
    }

    pub fn into_outcome(self) -> FetchOutcome {
        FetchOutcome {
            records: self.hot_list,
            source_name: self.source,
            degraded: self.is_test_data,
        }
    }
}

#[async_trait::async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn store(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Writes pretty-printed JSON, creating parent directories as needed.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl SnapshotSink for JsonFileSink {
    async fn store(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(snapshot).context("serializing snapshot")?;
        tokio::fs::write(&self.path, &body)
            .await
            .with_context(|| format!("writing snapshot to {}", self.path.display()))?;
        tracing::info!(
            path = %self.path.display(),
            bytes = body.len(),
            entries = snapshot.hot_list.len(),
            "snapshot saved"
        );
        Ok(())
    }
}

pub async fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading snapshot from {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Popularity;
    use chrono::NaiveDate;

    #[test]
    fn keys_are_written_in_declared_order() {
        let outcome = FetchOutcome {
            records: vec![Record {
                rank: 1,
                display_text: "话题".into(),
                popularity: Popularity::Int(10),
                label: String::new(),
                event_time: String::new(),
            }],
            source_name: "抖音热搜榜".into(),
            degraded: false,
        };
        let at = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        let json = serde_json::to_string(&Snapshot::from_outcome(&outcome, "all", at)).unwrap();

        let order = ["\"hot_list\"", "\"update_time\"", "\"source\"", "\"category\"", "\"is_test_data\""];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains("\"update_time\":\"2025-03-04 05:06:07\""));
        assert!(json.contains("话题"), "non-ASCII must not be escaped");
    }
}
