// src/notify/mod.rs
pub mod feishu;

use anyhow::Result;
use metrics::counter;

use crate::format::{Card, Formatter};
use crate::ingest::types::FetchOutcome;

pub use feishu::FeishuNotifier;

/// Outbound chat sink.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;
    async fn send_card(&self, card: &Card) -> Result<()>;
    fn name(&self) -> &'static str;
}

async fn send_text_logged(notifier: &dyn Notifier, text: &str) -> bool {
    match notifier.send_text(text).await {
        Ok(()) => {
            tracing::info!(sink = notifier.name(), chars = text.chars().count(), "text sent");
            counter!("notify_sends_total", "kind" => "text", "ok" => "true").increment(1);
            true
        }
        Err(e) => {
            tracing::error!(sink = notifier.name(), error = %format!("{e:#}"), "text send failed");
            counter!("notify_sends_total", "kind" => "text", "ok" => "false").increment(1);
            false
        }
    }
}

/// Deliver one outcome. Returns whether anything reached the sink.
///
/// Degraded and empty outcomes go out as plain text only. Otherwise the card is
/// tried first and the text form of the same data is the fallback. No retries.
pub async fn deliver(notifier: &dyn Notifier, outcome: &FetchOutcome, formatter: &Formatter) -> bool {
    let Some(card) = formatter.card(outcome) else {
        return send_text_logged(notifier, &formatter.format(outcome)).await;
    };

    match notifier.send_card(&card).await {
        Ok(()) => {
            tracing::info!(sink = notifier.name(), blocks = card.blocks.len(), "card sent");
            counter!("notify_sends_total", "kind" => "card", "ok" => "true").increment(1);
            true
        }
        Err(e) => {
            tracing::warn!(
                sink = notifier.name(),
                error = %format!("{e:#}"),
                "card send failed, falling back to text"
            );
            counter!("notify_sends_total", "kind" => "card", "ok" => "false").increment(1);
            send_text_logged(notifier, &formatter.format(outcome)).await
        }
    }
}

/// Best-effort failure notice; any error from the send is swallowed.
pub async fn notify_failure(notifier: &dyn Notifier, error: &anyhow::Error) {
    let text = format!(
        "⚠️ 抓取任务执行失败\n\n错误信息: {error:#}\n时间: {}",
        chrono::Local::now().format(crate::format::TIMESTAMP_FORMAT)
    );
    if let Err(e) = notifier.send_text(&text).await {
        tracing::debug!(error = %e, "failure notice could not be sent");
    }
}
