// src/ingest/extract.rs
//! Canonical field extraction from heterogeneous raw items.
//!
//! Each canonical field is read through an ordered alias list. Priority order
//! is part of the contract and must not be reshuffled.

use serde_json::{Map, Value};

use crate::ingest::types::{Popularity, Record};

pub type RawItem = Map<String, Value>;

/// Title aliases; first key present with a non-empty value wins.
pub const DISPLAY_TEXT_ALIASES: [&str; 6] =
    ["word", "title", "sentence", "query", "name", "music_title"];

/// Popularity aliases; first present non-zero value wins.
pub const POPULARITY_ALIASES: [&str; 4] = ["hot_value", "view_count", "hot_level", "search_count"];

/// Label aliases; first key present wins, even when its value is empty.
pub const LABEL_ALIASES: [&str; 2] = ["label", "tag"];

pub const EVENT_TIME_KEY: &str = "event_time";

/// Scalar view of a raw value as text. Zero numbers, `null`, booleans and
/// containers read as empty.
fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Scalar view of a raw value as a popularity score. Numeric strings are
/// accepted; zero, negative and non-numeric values read as absent.
fn scalar_popularity(v: &Value) -> Option<Popularity> {
    let p = match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Popularity::Int(u)
            } else {
                Popularity::Float(n.as_f64()?)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(u) = s.parse::<u64>() {
                Popularity::Int(u)
            } else {
                Popularity::Float(s.parse::<f64>().ok()?)
            }
        }
        _ => return None,
    };
    let f = p.as_f64();
    (f.is_finite() && f > 0.0).then_some(p)
}

pub fn display_text(item: &RawItem) -> String {
    DISPLAY_TEXT_ALIASES
        .iter()
        .filter_map(|k| item.get(*k))
        .map(scalar_text)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// A zero under an earlier alias counts as absent, so a later non-zero alias wins.
pub fn popularity(item: &RawItem) -> Popularity {
    POPULARITY_ALIASES
        .iter()
        .filter_map(|k| item.get(*k))
        .find_map(scalar_popularity)
        .unwrap_or_default()
}

pub fn label(item: &RawItem) -> String {
    LABEL_ALIASES
        .iter()
        .find_map(|k| item.get(*k))
        .map(scalar_text)
        .unwrap_or_default()
}

pub fn event_time(item: &RawItem) -> String {
    match item.get(EVENT_TIME_KEY) {
        // timestamps are passed through, including zero
        Some(Value::Number(n)) => n.to_string(),
        Some(v) => scalar_text(v),
        None => String::new(),
    }
}

/// Build a record from one raw item. `rank` comes from the caller.
pub fn extract(item: &RawItem, rank: u32) -> Record {
    Record {
        rank,
        display_text: display_text(item),
        popularity: popularity(item),
        label: label(item),
        event_time: event_time(item),
    }
}
