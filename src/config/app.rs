// src/config/app.rs
use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::format::{DisplaySettings, DEFAULT_TITLE_FORMAT};
use crate::ingest::prober::ProbeSettings;
use crate::ingest::types::SourceDescriptor;
use crate::snapshot::DEFAULT_SNAPSHOT_PATH;

/// Category key used when nothing else is selected; has no keywords.
pub const DEFAULT_CATEGORY: &str = "all";

fn default_true() -> bool {
    true
}
fn default_limit() -> usize {
    20
}
fn default_timeout() -> u64 {
    10
}
fn default_interval_hours() -> u64 {
    1
}
fn default_title_format() -> String {
    DEFAULT_TITLE_FORMAT.to_string()
}
fn default_snapshot_path() -> String {
    DEFAULT_SNAPSHOT_PATH.to_string()
}

fn default_headers() -> BTreeMap<String, String> {
    [
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ),
        ("Referer", "https://www.douyin.com/"),
        ("Accept", "application/json"),
        ("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_data_sources() -> Vec<DataSourceConfig> {
    vec![DataSourceConfig {
        id: "douyin".into(),
        enabled: true,
        name: "抖音热榜".into(),
        apis: vec![
            SourceDescriptor::new(
                "https://aweme.snssdk.com/aweme/v1/hot/search/list/",
                "hot_search",
                "抖音热搜榜",
            ),
            SourceDescriptor::new(
                "https://www.iesdouyin.com/web/api/v2/hotsearch/billboard/word/",
                "hot_search_legacy",
                "抖音热搜榜(旧版)",
            ),
            SourceDescriptor::new(
                "https://aweme.snssdk.com/aweme/v1/hotsearch/star/billboard/",
                "star",
                "明星榜",
            ),
            SourceDescriptor::new(
                "https://aweme.snssdk.com/aweme/v1/chart/music/list/",
                "music",
                "音乐榜",
            ),
        ],
    }]
}

fn default_categories() -> Vec<CategoryConfig> {
    let cat = |id: &str, enabled: bool, name: &str, keywords: &[&str], description: &str| {
        CategoryConfig {
            id: id.into(),
            enabled,
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: description.into(),
        }
    };
    vec![
        cat(DEFAULT_CATEGORY, true, "综合热榜", &[], "所有热门内容"),
        cat(
            "tech",
            false,
            "科技数码",
            &["科技", "AI", "数码", "手机", "芯片", "互联网"],
            "科技与数码相关话题",
        ),
        cat(
            "entertainment",
            false,
            "娱乐明星",
            &["电影", "电视剧", "综艺", "明星", "音乐", "演唱会"],
            "影视娱乐相关话题",
        ),
    ]
}

/// A named group of endpoints, tried in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSourceConfig {
    pub id: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub apis: Vec<SourceDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryConfig {
    pub id: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Optional cap over all source attempts of one run, in seconds.
    #[serde(default)]
    pub total_budget_secs: Option<u64>,
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            timeout: default_timeout(),
            total_budget_secs: None,
            headers: default_headers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_source: bool,
    #[serde(default = "default_true")]
    pub show_hot_value: bool,
    #[serde(default = "default_true")]
    pub show_label: bool,
    #[serde(default = "default_title_format")]
    pub title_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_source: true,
            show_hot_value: true,
            show_label: true,
            title_format: default_title_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_snapshot_path(),
        }
    }
}

/// Root configuration. Every section is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_sources")]
    pub data_sources: Vec<DataSourceConfig>,
    #[serde(default = "default_categories")]
    pub content_categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Category applied to each run; `None` means the default category.
    #[serde(default)]
    pub category: Option<String>,
    /// Feishu webhook; normally supplied through the environment.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Environment restrictions (`ENABLED_DATA_SOURCES`, `ENABLED_CATEGORIES`).
    #[serde(skip)]
    pub enabled_sources_override: Option<Vec<String>>,
    #[serde(skip)]
    pub enabled_categories_override: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_sources: default_data_sources(),
            content_categories: default_categories(),
            scraper: ScraperConfig::default(),
            display: DisplayConfig::default(),
            schedule: ScheduleConfig::default(),
            snapshot: SnapshotConfig::default(),
            category: None,
            webhook_url: None,
            enabled_sources_override: None,
            enabled_categories_override: None,
        }
    }
}

impl AppConfig {
    /// Sources selected by the environment list, else those marked enabled.
    pub fn enabled_sources(&self) -> Vec<&DataSourceConfig> {
        match &self.enabled_sources_override {
            Some(ids) => self
                .data_sources
                .iter()
                .filter(|s| ids.iter().any(|id| id == &s.id))
                .collect(),
            None => self.data_sources.iter().filter(|s| s.enabled).collect(),
        }
    }

    /// Flattened endpoint list in priority order.
    pub fn source_descriptors(&self) -> Vec<SourceDescriptor> {
        self.enabled_sources()
            .into_iter()
            .flat_map(|s| s.apis.iter().cloned())
            .filter(|api| !api.url.trim().is_empty())
            .collect()
    }

    /// Environment selection if it matches anything, else enabled entries,
    /// else the default category alone.
    pub fn enabled_categories(&self) -> Vec<&CategoryConfig> {
        if let Some(ids) = &self.enabled_categories_override {
            let picked: Vec<_> = self
                .content_categories
                .iter()
                .filter(|c| ids.iter().any(|id| id == &c.id))
                .collect();
            if !picked.is_empty() {
                return picked;
            }
        }

        let enabled: Vec<_> = self.content_categories.iter().filter(|c| c.enabled).collect();
        if enabled.is_empty() {
            return self
                .content_categories
                .iter()
                .filter(|c| c.id == DEFAULT_CATEGORY)
                .collect();
        }
        enabled
    }

    /// Keywords of an enabled category; `None` when the category is unknown or disabled.
    pub fn category_keywords(&self, id: &str) -> Option<&[String]> {
        self.enabled_categories()
            .into_iter()
            .find(|c| c.id == id)
            .map(|c| c.keywords.as_slice())
    }

    /// Display name of any configured category, falling back to its key.
    pub fn category_name(&self, id: &str) -> String {
        self.content_categories
            .iter()
            .find(|c| c.id == id && !c.name.is_empty())
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Category for this run.
    pub fn run_category(&self) -> String {
        self.category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        let mut settings = ProbeSettings::new(
            self.source_descriptors(),
            self.scraper.limit,
            Duration::from_secs(self.scraper.timeout),
        )
        .with_headers(self.scraper.headers.clone());
        if let Some(secs) = self.scraper.total_budget_secs {
            settings = settings.with_total_budget(Duration::from_secs(secs));
        }
        settings
    }

    pub fn display_settings(&self, category: &str) -> DisplaySettings {
        DisplaySettings {
            show_source: self.display.show_source,
            show_popularity: self.display.show_hot_value,
            show_label: self.display.show_label,
            title_format: self.display.title_format.clone(),
            category_name: self.category_name(category),
        }
    }

    /// Basic sanity checks.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.limit == 0 {
            bail!("scraper.limit must be > 0");
        }
        if self.scraper.timeout == 0 {
            bail!("scraper.timeout must be > 0");
        }
        if self.schedule.interval_hours == 0 {
            bail!("schedule.interval_hours must be > 0");
        }
        if self.source_descriptors().is_empty() {
            bail!("no enabled data source has an API url");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_ordered() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        let urls: Vec<_> = cfg.source_descriptors().into_iter().map(|d| d.url).collect();
        assert_eq!(urls.len(), 4);
        assert!(urls[0].contains("hot/search/list"));
        assert!(urls[3].contains("music"));
        assert_eq!(cfg.scraper.limit, 20);
        assert_eq!(cfg.scraper.timeout, 10);
    }

    #[test]
    fn category_fallbacks() {
        let mut cfg = AppConfig::default();
        let ids = |cfg: &AppConfig| {
            cfg.enabled_categories()
                .iter()
                .map(|c| c.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&cfg), vec!["all"]);

        // nothing enabled → default category only
        cfg.content_categories.iter_mut().for_each(|c| c.enabled = false);
        assert_eq!(ids(&cfg), vec!["all"]);

        // env list wins when it selects something, even disabled entries
        cfg.enabled_categories_override = Some(vec!["tech".into()]);
        assert_eq!(ids(&cfg), vec!["tech"]);
        assert!(cfg.category_keywords("tech").unwrap().contains(&"科技".to_string()));
        assert!(cfg.category_keywords("nope").is_none());

        // env list matching nothing is ignored
        cfg.enabled_categories_override = Some(vec!["nope".into()]);
        assert_eq!(ids(&cfg), vec!["all"]);
    }

    #[test]
    fn source_override_restricts_by_id() {
        let mut cfg = AppConfig::default();
        cfg.enabled_sources_override = Some(vec!["weibo".into()]);
        assert!(cfg.source_descriptors().is_empty());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn category_name_falls_back_to_key() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.category_name("tech"), "科技数码");
        assert_eq!(cfg.category_name("sports"), "sports");
    }
}
