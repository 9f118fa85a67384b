// src/ingest/category.rs
use crate::ingest::types::Record;

/// Keep records whose display text contains at least one keyword.
///
/// - Empty keyword list passes everything through.
/// - Matching is case-sensitive substring containment.
/// - Order and rank are preserved; ranks are NOT renumbered.
pub fn filter<S: AsRef<str>>(records: Vec<Record>, keywords: &[S]) -> Vec<Record> {
    if keywords.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| keywords.iter().any(|k| r.display_text.contains(k.as_ref())))
        .collect()
}
