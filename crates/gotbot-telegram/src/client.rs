//! Bot API HTTP client: long-poll fetch, chunked replies, chat actions, command menu.

use crate::types::{ApiResponse, BotCommand, ChatAction, Update};
use gotbot_config::DEFAULT_API_URL;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram {method} request failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("telegram {method} HTTP {status}: {body}")]
    Status {
        method: &'static str,
        status: u16,
        body: String,
    },
    #[error("telegram {method} decode failed: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("telegram {method} returned ok=false: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

impl TelegramError {
    /// True when Telegram answered but refused the request, as opposed to a transport fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Api { .. })
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_url: String,
    bot_token: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(bot_token: impl Into<String>) -> Result<Self, TelegramError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(600))
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| TelegramError::Http {
                method: "client",
                source,
            })?;

        let bot_token = bot_token.into();
        Ok(Self {
            client,
            api_url: format!("{}/bot{}", DEFAULT_API_URL, bot_token),
            bot_token,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        })
    }

    /// Points the client at another Bot API server, e.g. a local one.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_url = format!("{}/bot{}", base_url.trim_end_matches('/'), self.bot_token);
        self
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    /// Numeric bot id, the part of the token before `:`.
    pub fn bot_id(&self) -> &str {
        self.bot_token.split(':').next().unwrap_or_default()
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let payload = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message"],
        });
        // The long poll outlives the default request timeout.
        let timeout = Duration::from_secs(self.poll_timeout_secs + REQUEST_TIMEOUT_SECS);
        self.call("getUpdates", &payload, Some(timeout)).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        for chunk in chunk_message(text) {
            let payload = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
                "parse_mode": "Markdown",
            });
            self.send_with_markdown_fallback("sendMessage", payload)
                .await?;
        }
        Ok(())
    }

    pub async fn send_chat_action(
        &self,
        chat_id: i64,
        action: ChatAction,
    ) -> Result<(), TelegramError> {
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "action": action.as_str(),
        });
        self.call::<serde_json::Value>("sendChatAction", &payload, None)
            .await?;
        Ok(())
    }

    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError> {
        let payload = serde_json::json!({ "commands": commands });
        self.call::<serde_json::Value>("setMyCommands", &payload, None)
            .await?;
        Ok(())
    }

    async fn send_with_markdown_fallback(
        &self,
        method: &'static str,
        payload: serde_json::Value,
    ) -> Result<(), TelegramError> {
        match self
            .call::<serde_json::Value>(method, &payload, None)
            .await
        {
            Ok(_) => return Ok(()),
            Err(err) if err.is_rejection() => {
                warn!(
                    error = %err,
                    "telegram {} rejected Markdown payload, retrying without parse_mode", method
                );
            }
            Err(err) => return Err(err),
        }

        let mut fallback_payload = payload;
        if let Some(obj) = fallback_payload.as_object_mut() {
            obj.remove("parse_mode");
        }
        self.call::<serde_json::Value>(method, &fallback_payload, None)
            .await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        payload: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError> {
        let url = format!("{}/{}", self.api_url, method);
        let mut request = self.client.post(&url).json(payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let resp = request
            .send()
            .await
            .map_err(|source| TelegramError::Http { method, source })?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|source| TelegramError::Http { method, source })?;

        if !status.is_success() {
            return Err(TelegramError::Status {
                method,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|source| TelegramError::Decode { method, source })?;
        if !parsed.ok {
            return Err(TelegramError::Api {
                method,
                description: parsed.description.unwrap_or_default(),
            });
        }

        parsed.result.ok_or_else(|| TelegramError::Api {
            method,
            description: "response carried no result".to_string(),
        })
    }
}

/// Splits text into pieces of at most 4096 characters, preferring to break
/// after whitespace or sentence punctuation.
pub fn chunk_message(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= TELEGRAM_MAX_MESSAGE_LEN {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = (start + TELEGRAM_MAX_MESSAGE_LEN).min(chars.len());

        if end < chars.len() {
            if let Some(split) = (start..end)
                .rev()
                .find(|&i| matches!(chars[i], '\n' | ' ' | '.' | '!' | '?'))
            {
                end = split + 1;
            }
        }

        chunks.push(chars[start..end].iter().collect::<String>());
        start = end;
    }

    chunks
}
