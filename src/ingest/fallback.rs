// src/ingest/fallback.rs
//! Fixed synthetic hot list used when every live source failed.

use crate::ingest::types::{FetchOutcome, Popularity, Record};

pub const DEGRADED_SOURCE_NAME: &str = "测试数据";

const TOPICS: [&str; 20] = [
    "春节档电影票房破纪录",
    "AI 技术新突破",
    "2024 年经济展望",
    "健康生活方式分享",
    "科技创新引领未来",
    "环保出行新方案",
    "美食制作小技巧",
    "旅游目的地推荐",
    "职场技能提升",
    "家居装饰灵感",
    "运动健身日常",
    "读书分享会",
    "音乐节精彩瞬间",
    "艺术展览回顾",
    "时尚穿搭指南",
    "宠物日常趣事",
    "数码产品测评",
    "游戏攻略分享",
    "教育资源推荐",
    "公益活动参与",
];

/// Deterministic: same content every call, descending popularity, top three labelled.
pub fn synthetic_records(limit: usize) -> Vec<Record> {
    TOPICS
        .iter()
        .take(limit)
        .enumerate()
        .map(|(idx, topic)| Record {
            rank: idx as u32 + 1,
            display_text: (*topic).to_string(),
            popularity: Popularity::Int((TOPICS.len() - idx) as u64 * 10_000_000),
            label: if idx < 3 { "热".to_string() } else { String::new() },
            event_time: String::new(),
        })
        .collect()
}

pub fn degraded_outcome(limit: usize) -> FetchOutcome {
    FetchOutcome {
        records: synthetic_records(limit),
        source_name: DEGRADED_SOURCE_NAME.to_string(),
        degraded: true,
    }
}
