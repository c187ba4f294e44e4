use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::services::notification_service::{Notifier, OutgoingMessage};

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<JsonValue>,
}

/// Thin client for the Telegram Bot HTTP API.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_url: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, bot_token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    async fn call(&self, method: &str, body: &JsonValue) -> Result<Option<JsonValue>> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                Error::Upstream(format!("Telegram {} request failed: {}", method, e.without_url()))
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "Telegram {} returned {}: {}",
                method, status, text
            )));
        }

        let parsed: BotApiResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Upstream(format!("Telegram {} sent malformed body: {}", method, e)))?;
        if !parsed.ok {
            return Err(Error::Upstream(format!(
                "Telegram {} failed: {}",
                method,
                parsed.description.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        Ok(parsed.result)
    }

    /// Currently registered webhook URL, empty when none.
    pub async fn get_webhook_url(&self) -> Result<String> {
        let result = self.call("getWebhookInfo", &json!({})).await?;
        Ok(result
            .as_ref()
            .and_then(|r| r.get("url"))
            .and_then(|u| u.as_str())
            .unwrap_or_default()
            .to_string())
    }

    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let mut body = json!({ "url": url, "allowed_updates": ["message"] });
        if let Some(secret) = secret_token {
            body["secret_token"] = json!(secret);
        }
        self.call("setWebhook", &body).await?;
        Ok(())
    }

    /// Points the bot at `target_url` unless it already is.
    pub async fn ensure_webhook(&self, target_url: &str, secret_token: Option<&str>) -> Result<()> {
        let current = self.get_webhook_url().await?;
        if current == target_url {
            tracing::info!(url = %current, "telegram webhook is already up to date");
            return Ok(());
        }
        tracing::info!(from = %current, to = %target_url, "updating telegram webhook");
        self.set_webhook(target_url, secret_token).await
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send_message(&self, message: OutgoingMessage) -> Result<()> {
        let mut body = json!({
            "chat_id": message.chat_id,
            "text": message.text,
        });
        if let Some(mode) = message.parse_mode {
            body["parse_mode"] = json!(mode);
        }
        if let Some(markup) = message.reply_markup {
            body["reply_markup"] = markup;
        }

        self.call("sendMessage", &body).await?;
        tracing::debug!(chat_id = message.chat_id, "telegram message sent");
        Ok(())
    }
}
