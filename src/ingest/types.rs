// src/ingest/types.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// Relative intensity score of a hot-list entry. Integers and floats are kept
/// apart so the raw value renders the way the upstream sent it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Popularity {
    Int(u64),
    Float(f64),
}

impl Popularity {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Popularity::Int(v) => v as f64,
            Popularity::Float(v) => v,
        }
    }

    /// Only strictly positive scores are worth displaying.
    pub fn is_positive(&self) -> bool {
        self.as_f64() > 0.0
    }
}

impl Default for Popularity {
    fn default() -> Self {
        Popularity::Int(0)
    }
}

impl fmt::Display for Popularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Popularity::Int(v) => write!(f, "{v}"),
            // keep a trailing ".0" on whole floats so 3.0 does not read as an integer
            Popularity::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.1}"),
            Popularity::Float(v) => write!(f, "{v}"),
        }
    }
}

/// One canonical hot-list entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Record {
    /// 1-based, dense, assigned by extraction order.
    pub rank: u32,
    #[serde(rename = "word")]
    pub display_text: String,
    #[serde(rename = "hot_value")]
    pub popularity: Popularity,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub event_time: String,
}

/// One candidate endpoint, in priority order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub url: String,
    #[serde(rename = "type", default)]
    pub declared_kind: String,
    #[serde(rename = "description", default)]
    pub display_name: String,
}

impl SourceDescriptor {
    pub fn new(
        url: impl Into<String>,
        declared_kind: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            declared_kind: declared_kind.into(),
            display_name: display_name.into(),
        }
    }
}

/// Result of one full probe run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub records: Vec<Record>,
    pub source_name: String,
    /// True exactly when every live source failed and the synthetic set was substituted.
    pub degraded: bool,
}

impl FetchOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same outcome with a different record set (used after category filtering).
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            records,
            source_name: self.source_name.clone(),
            degraded: self.degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popularity_display_keeps_int_and_float_apart() {
        assert_eq!(Popularity::Int(500).to_string(), "500");
        assert_eq!(Popularity::Float(12.5).to_string(), "12.5");
        assert_eq!(Popularity::Float(3.0).to_string(), "3.0");
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let r = Record {
            rank: 1,
            display_text: "abc".into(),
            popularity: Popularity::Int(7),
            label: "热".into(),
            event_time: String::new(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["word"], "abc");
        assert_eq!(v["hot_value"], 7);
        assert!(v.get("display_text").is_none());
    }
}
