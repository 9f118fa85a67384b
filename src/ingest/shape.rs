// src/ingest/shape.rs
//! Response shape sniffing.
//!
//! Upstream endpoints answer with tagged or untagged envelopes and inconsistent
//! nesting. Rules are tried in a fixed order and the first match wins, so an
//! object that partially matches several shapes always resolves the same way.

use serde_json::Value;

/// Status value upstreams use for "ok".
const STATUS_OK: i64 = 0;
const STATUS_KEY: &str = "status_code";
const PRIMARY_LIST_KEY: &str = "word_list";
const DATA_KEY: &str = "data";
const EXTRA_KEY: &str = "extra";
const SECONDARY_LIST_KEY: &str = "list";

/// Generic list-bearing keys, tried in this order as the last resort.
const GENERIC_LIST_KEYS: [&str; 6] = ["word_list", "list", "data", "items", "hot_list", "search_list"];

/// Which rule matched; handy for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    StatusWordList,
    DataWordList,
    DataList,
    TopLevelList,
    ExtraList,
    GenericKey(&'static str),
}

impl Shape {
    pub fn describe(&self) -> String {
        match self {
            Shape::StatusWordList => "status_code + word_list".to_string(),
            Shape::DataWordList => "data.word_list".to_string(),
            Shape::DataList => "data[]".to_string(),
            Shape::TopLevelList => "top-level list".to_string(),
            Shape::ExtraList => "extra.list".to_string(),
            Shape::GenericKey(k) => format!("generic key `{k}`"),
        }
    }
}

fn non_empty_list(v: Option<&Value>) -> Option<&[Value]> {
    v.and_then(Value::as_array)
        .map(Vec::as_slice)
        .filter(|a| !a.is_empty())
}

/// Resolve the raw item list out of a parsed response.
///
/// `None` means "cannot parse", which callers treat as a failure of that source.
pub fn resolve(data: &Value) -> Option<(Shape, &[Value])> {
    if let Some(obj) = data.as_object() {
        // 1) {status_code: 0, word_list: [...]}
        if obj.get(STATUS_KEY).and_then(Value::as_i64) == Some(STATUS_OK) {
            if let Some(list) = non_empty_list(obj.get(PRIMARY_LIST_KEY)) {
                return Some((Shape::StatusWordList, list));
            }
        }

        // 2) {data: {word_list: [...]}}
        if let Some(inner) = obj.get(DATA_KEY).and_then(Value::as_object) {
            if let Some(list) = non_empty_list(inner.get(PRIMARY_LIST_KEY)) {
                return Some((Shape::DataWordList, list));
            }
        }

        // 3) {data: [...]}
        if let Some(list) = non_empty_list(obj.get(DATA_KEY)) {
            return Some((Shape::DataList, list));
        }
    }

    // 4) [...]
    if let Some(list) = non_empty_list(Some(data)) {
        return Some((Shape::TopLevelList, list));
    }

    if let Some(obj) = data.as_object() {
        // 5) {extra: {list: [...]}}
        if let Some(extra) = obj.get(EXTRA_KEY).and_then(Value::as_object) {
            if let Some(list) = non_empty_list(extra.get(SECONDARY_LIST_KEY)) {
                return Some((Shape::ExtraList, list));
            }
        }

        // 6) any well-known list key
        for key in GENERIC_LIST_KEYS {
            if let Some(list) = non_empty_list(obj.get(key)) {
                return Some((Shape::GenericKey(key), list));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn first_word(v: &Value) -> (Shape, String) {
        let (shape, items) = resolve(v).expect("shape should resolve");
        (shape, items[0]["word"].as_str().unwrap_or_default().to_string())
    }

    #[test]
    fn rule_1_status_and_word_list() {
        let v = json!({"status_code": 0, "word_list": [{"word": "a"}]});
        assert_eq!(first_word(&v), (Shape::StatusWordList, "a".into()));
    }

    #[test]
    fn rule_1_requires_ok_status() {
        // non-zero status falls through to the generic `word_list` key
        let v = json!({"status_code": 8, "word_list": [{"word": "a"}]});
        assert_eq!(first_word(&v).0, Shape::GenericKey("word_list"));
    }

    #[test]
    fn rule_2_nested_data_word_list() {
        let v = json!({"data": {"word_list": [{"word": "b"}]}});
        assert_eq!(first_word(&v), (Shape::DataWordList, "b".into()));
    }

    #[test]
    fn rule_3_data_is_list() {
        let v = json!({"data": [{"word": "c"}]});
        assert_eq!(first_word(&v), (Shape::DataList, "c".into()));
    }

    #[test]
    fn rule_4_top_level_list() {
        let v = json!([{"word": "d"}]);
        assert_eq!(first_word(&v), (Shape::TopLevelList, "d".into()));
    }

    #[test]
    fn rule_5_extra_list() {
        let v = json!({"extra": {"list": [{"word": "e"}]}});
        assert_eq!(first_word(&v), (Shape::ExtraList, "e".into()));
    }

    #[test]
    fn rule_6_generic_keys_in_priority_order() {
        let v = json!({"search_list": [{"word": "z"}], "items": [{"word": "f"}]});
        assert_eq!(first_word(&v), (Shape::GenericKey("items"), "f".into()));
    }

    #[test]
    fn earlier_rule_wins_when_two_match() {
        let v = json!({
            "status_code": 0,
            "word_list": [{"word": "one"}],
            "data": {"word_list": [{"word": "two"}]}
        });
        assert_eq!(first_word(&v), (Shape::StatusWordList, "one".into()));

        let v = json!({
            "data": {"word_list": [{"word": "nested"}]},
            "extra": {"list": [{"word": "extra"}]}
        });
        assert_eq!(first_word(&v), (Shape::DataWordList, "nested".into()));

        let v = json!({
            "data": [{"word": "direct"}],
            "items": [{"word": "generic"}]
        });
        assert_eq!(first_word(&v), (Shape::DataList, "direct".into()));
    }

    #[test]
    fn scalar_data_does_not_block_later_rules() {
        let v = json!({"data": "n/a", "extra": {"list": [{"word": "x"}]}});
        assert_eq!(first_word(&v), (Shape::ExtraList, "x".into()));
    }

    #[test]
    fn unknown_or_empty_shapes_resolve_to_none() {
        assert!(resolve(&json!({"status_code": 0, "word_list": []})).is_none());
        assert!(resolve(&json!({"foo": [1, 2]})).is_none());
        assert!(resolve(&json!([])).is_none());
        assert!(resolve(&json!(42)).is_none());
        assert!(resolve(&json!(null)).is_none());
    }
}
