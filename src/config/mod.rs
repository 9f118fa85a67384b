// src/config/mod.rs
//! Configuration file + environment overlay.
//!
//! Lookup order for the file:
//! 1) $HOT_LIST_CONFIG
//! 2) config/hot_list.toml
//! 3) config/hot_list.json
//! 4) built-in defaults
//!
//! An unreadable or malformed file logs a warning and falls back to defaults.
//! Environment variables are applied on top and are only read here.

pub mod app;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

pub use app::{AppConfig, CategoryConfig, DataSourceConfig, DEFAULT_CATEGORY};

pub const ENV_CONFIG_PATH: &str = "HOT_LIST_CONFIG";
const DEFAULT_TOML_PATH: &str = "config/hot_list.toml";
const DEFAULT_JSON_PATH: &str = "config/hot_list.json";

/// Parse a config file. TOML or JSON, picked by extension with a content fallback.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AppConfig> {
    if hint_ext == "json" || s.trim_start().starts_with('{') {
        if let Ok(cfg) = serde_json::from_str(s) {
            return Ok(cfg);
        }
    }
    match toml::from_str(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported config format: {toml_err}")),
    }
}

/// Locate and load the config file without environment overlays.
pub fn load_file_or_default() -> AppConfig {
    let candidate = match std::env::var(ENV_CONFIG_PATH) {
        Ok(p) => Some(PathBuf::from(p)),
        Err(_) => [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH]
            .into_iter()
            .map(PathBuf::from)
            .find(|p| p.exists()),
    };

    let Some(path) = candidate else {
        tracing::info!("no config file found, using defaults");
        return AppConfig::default();
    };

    match load_from(&path) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), "config loaded");
            cfg
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "config load failed, using defaults");
            AppConfig::default()
        }
    }
}

/// File (or defaults) plus process environment.
pub fn load() -> AppConfig {
    let mut cfg = load_file_or_default();
    apply_env(&mut cfg, |k| std::env::var(k).ok());
    cfg
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_num<T: std::str::FromStr>(key: &str, v: &str) -> Option<T> {
    match v.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value = v, "ignoring non-numeric environment override");
            None
        }
    }
}

/// Apply environment overrides through `lookup`.
pub fn apply_env<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("ENABLED_DATA_SOURCES") {
        cfg.enabled_sources_override = Some(split_list(&v));
    }
    if let Some(v) = get("ENABLED_CATEGORIES") {
        let ids = split_list(&v);
        if cfg.category.is_none() {
            cfg.category = ids.first().cloned();
        }
        cfg.enabled_categories_override = Some(ids);
    }
    if let Some(v) = get("CONTENT_CATEGORY") {
        cfg.category = Some(v.trim().to_string());
    }
    if let Some(n) = get("HOT_LIST_LIMIT").and_then(|v| parse_num::<usize>("HOT_LIST_LIMIT", &v)) {
        cfg.scraper.limit = n;
    }
    if let Some(n) = get("REQUEST_TIMEOUT").and_then(|v| parse_num::<u64>("REQUEST_TIMEOUT", &v)) {
        cfg.scraper.timeout = n;
    }
    if let Some(n) =
        get("SCRAPE_INTERVAL_HOURS").and_then(|v| parse_num::<u64>("SCRAPE_INTERVAL_HOURS", &v))
    {
        cfg.schedule.interval_hours = n;
    }
    if let Some(v) = get("FEISHU_WEBHOOK_URL") {
        cfg.webhook_url = Some(v.trim().to_string());
    }
    if let Some(v) = get("SNAPSHOT_PATH") {
        cfg.snapshot.enabled = true;
        cfg.snapshot.path = v.trim().to_string();
    }
}
