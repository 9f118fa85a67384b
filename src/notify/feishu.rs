use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::Notifier;
use crate::format::Card;

#[derive(Clone)]
pub struct FeishuNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl FeishuNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    async fn post(&self, payload: &Value) -> Result<()> {
        let rsp = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .context("feishu post")?
            .error_for_status()
            .context("feishu non-2xx")?;

        let reply: FeishuReply = rsp.json().await.context("feishu reply body")?;
        match reply.code.or(reply.status_code) {
            Some(0) => Ok(()),
            code => Err(anyhow!(
                "feishu rejected message: code={:?} msg={}",
                code,
                reply
                    .msg
                    .or(reply.status_message)
                    .unwrap_or_else(|| "unknown error".to_string())
            )),
        }
    }
}

/// Newer replies carry `code`/`msg`, legacy ones `StatusCode`/`StatusMessage`, some both.
#[derive(Debug, Deserialize)]
struct FeishuReply {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default, rename = "StatusCode")]
    status_code: Option<i64>,
    #[serde(default, rename = "StatusMessage")]
    status_message: Option<String>,
}

#[derive(Serialize)]
struct PlainText<'a> {
    tag: &'static str,
    content: &'a str,
}

impl<'a> PlainText<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            tag: "plain_text",
            content,
        }
    }
}

pub fn text_payload(text: &str) -> Value {
    json!({
        "msg_type": "text",
        "content": { "text": text }
    })
}

/// Interactive card: timestamp, rule, then blocks separated by rules.
pub fn card_payload(card: &Card) -> Value {
    let mut elements = vec![
        json!({ "tag": "div", "text": PlainText::new(&card.timestamp) }),
        json!({ "tag": "hr" }),
    ];
    for (idx, block) in card.blocks.iter().enumerate() {
        if idx > 0 {
            elements.push(json!({ "tag": "hr" }));
        }
        let content = block.text();
        elements.push(json!({ "tag": "div", "text": PlainText::new(&content) }));
    }

    json!({
        "msg_type": "interactive",
        "card": {
            "header": {
                "title": PlainText::new(&card.title),
                "template": "blue"
            },
            "elements": elements
        }
    })
}

#[async_trait::async_trait]
impl Notifier for FeishuNotifier {
    async fn send_text(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            bail!("refusing to send empty text message");
        }
        tracing::debug!(chars = text.chars().count(), "sending feishu text");
        self.post(&text_payload(text)).await
    }

    async fn send_card(&self, card: &Card) -> Result<()> {
        if card.blocks.is_empty() {
            bail!("refusing to send a card without entries");
        }
        let payload = card_payload(card);
        tracing::debug!(
            title = %card.title,
            bytes = payload.to_string().len(),
            "sending feishu card"
        );
        self.post(&payload).await
    }

    fn name(&self) -> &'static str {
        "feishu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::CardBlock;

    #[test]
    fn card_payload_layout() {
        let card = Card {
            title: "📊 t Top2".into(),
            timestamp: "更新时间: now".into(),
            blocks: vec![
                CardBlock {
                    headline: "🥇 a".into(),
                    popularity: "🔥 热度: 1".into(),
                },
                CardBlock {
                    headline: "🥈 b".into(),
                    popularity: "🔥 热度: 2".into(),
                },
            ],
        };
        let v = card_payload(&card);
        assert_eq!(v["msg_type"], "interactive");
        assert_eq!(v["card"]["header"]["title"]["content"], "📊 t Top2");
        let elements = v["card"]["elements"].as_array().unwrap();
        let tags: Vec<&str> = elements.iter().map(|e| e["tag"].as_str().unwrap()).collect();
        assert_eq!(tags, vec!["div", "hr", "div", "hr", "div"]);
        assert_eq!(elements[2]["text"]["content"], "🥇 a\n🔥 热度: 1");
    }

    #[test]
    fn text_payload_layout() {
        let v = text_payload("hi");
        assert_eq!(v["msg_type"], "text");
        assert_eq!(v["content"]["text"], "hi");
    }
}
