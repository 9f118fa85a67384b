//! Rendering of fetch outcomes into chat payloads.
//!
//! Two forms exist: the plain text message (always used for degraded data) and
//! a structured card capped at ten entries for sinks that support it.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::ingest::types::{FetchOutcome, Popularity, Record};

/// Sentinel for an empty record set, regardless of degraded state.
pub const NO_DATA_TEXT: &str = "暂无热榜数据";
pub const CARD_MAX_BLOCKS: usize = 10;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_TITLE_FORMAT: &str = "📊 {source} - {category} Top{count}";

const GENERIC_SOURCE_LABEL: &str = "热榜";
const HUNDRED_MILLION: f64 = 100_000_000.0;
const TEN_THOUSAND: f64 = 10_000.0;

/// Display toggles resolved from config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub show_source: bool,
    pub show_popularity: bool,
    pub show_label: bool,
    /// Supports `{source}`, `{category}` and `{count}` placeholders.
    pub title_format: String,
    /// Human name of the category the outcome was filtered by.
    pub category_name: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_source: true,
            show_popularity: true,
            show_label: true,
            title_format: DEFAULT_TITLE_FORMAT.to_string(),
            category_name: "综合热榜".to_string(),
        }
    }
}

/// Size-banded popularity: `1.5亿`, `3.4万`, or the raw value.
pub fn format_popularity(p: &Popularity) -> String {
    let v = p.as_f64();
    if v >= HUNDRED_MILLION {
        format!("{:.1}亿", v / HUNDRED_MILLION)
    } else if v >= TEN_THOUSAND {
        format!("{:.1}万", v / TEN_THOUSAND)
    } else {
        p.to_string()
    }
}

/// Medal for the podium, `"{rank}."` otherwise.
pub fn rank_icon(rank: u32) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{n}."),
    }
}

/// Structured card payload; sink-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub timestamp: String,
    pub blocks: Vec<CardBlock>,
}

/// Two-line unit: topic + label, then popularity.
#[derive(Debug, Clone, PartialEq)]
pub struct CardBlock {
    pub headline: String,
    pub popularity: String,
}

impl CardBlock {
    pub fn text(&self) -> String {
        format!("{}\n{}", self.headline, self.popularity)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    display: DisplaySettings,
}

impl Formatter {
    pub fn new(display: DisplaySettings) -> Self {
        Self { display }
    }

    pub fn display(&self) -> &DisplaySettings {
        &self.display
    }

    fn title(&self, outcome: &FetchOutcome, count: usize) -> String {
        let source = if self.display.show_source {
            outcome.source_name.as_str()
        } else {
            GENERIC_SOURCE_LABEL
        };
        self.display
            .title_format
            .replace("{source}", source)
            .replace("{category}", &self.display.category_name)
            .replace("{count}", &count.to_string())
    }

    fn headline(&self, r: &Record) -> String {
        let mut line = format!("{} {}", rank_icon(r.rank), r.display_text);
        if self.display.show_label && !r.label.is_empty() {
            line.push_str(&format!(" [{}]", r.label));
        }
        line
    }

    /// One text line per record.
    pub fn record_line(&self, r: &Record) -> String {
        let mut line = self.headline(r);
        if self.display.show_popularity && r.popularity.is_positive() {
            line.push_str(&format!(" 🔥{}", format_popularity(&r.popularity)));
        }
        line
    }

    pub fn format(&self, outcome: &FetchOutcome) -> String {
        self.format_at(outcome, Local::now().naive_local())
    }

    pub fn format_at(&self, outcome: &FetchOutcome, at: NaiveDateTime) -> String {
        if outcome.records.is_empty() {
            return NO_DATA_TEXT.to_string();
        }

        let ts = at.format(TIMESTAMP_FORMAT);
        let mut lines = if outcome.degraded {
            vec![
                format!("⚠️ 热榜服务异常 - 测试数据 ({ts})"),
                String::new(),
                "说明：当前热榜 API 无法访问，以下为测试数据。".to_string(),
                "可能原因：网络限制、API 地址变更、需要登录态等。".to_string(),
                String::new(),
            ]
        } else {
            vec![
                format!("{} ({ts})", self.title(outcome, outcome.records.len())),
                String::new(),
            ]
        };

        lines.extend(outcome.records.iter().map(|r| self.record_line(r)));
        lines.join("\n")
    }

    pub fn card(&self, outcome: &FetchOutcome) -> Option<Card> {
        self.card_at(outcome, Local::now().naive_local())
    }

    /// `None` for degraded or empty outcomes: synthetic data never goes out as a card.
    pub fn card_at(&self, outcome: &FetchOutcome, at: NaiveDateTime) -> Option<Card> {
        if outcome.degraded || outcome.records.is_empty() {
            return None;
        }

        let blocks: Vec<CardBlock> = outcome
            .records
            .iter()
            .take(CARD_MAX_BLOCKS)
            .map(|r| CardBlock {
                headline: self.headline(r),
                popularity: format!("🔥 热度: {}", format_popularity(&r.popularity)),
            })
            .collect();

        Some(Card {
            title: self.title(outcome, blocks.len()),
            timestamp: format!("更新时间: {}", at.format(TIMESTAMP_FORMAT)),
            blocks,
        })
    }
}
