//! Ports to the chat transport, implemented for the Bot API client.

use anyhow::Result;
use gotbot_telegram::{ChatAction, TelegramClient, Update};

/// Long-poll source of updates, starting at `offset`.
#[async_trait::async_trait]
pub trait UpdateSource: Send + Sync {
    async fn fetch_updates(&self, offset: i64) -> Result<Vec<Update>>;
}

#[async_trait::async_trait]
pub trait ChatSink: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<()>;
}

#[async_trait::async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch_updates(&self, offset: i64) -> Result<Vec<Update>> {
        Ok(self.get_updates(offset).await?)
    }
}

#[async_trait::async_trait]
impl ChatSink for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        Ok(self.send_message(chat_id, text).await?)
    }

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<()> {
        Ok(TelegramClient::send_chat_action(self, chat_id, action).await?)
    }
}
