//! Best-effort recording of every chat and human author seen, ahead of dispatch.

use crate::context::Context;
use crate::handler::Handler;
use anyhow::Result;
use gotbot_telegram::Update;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub handle: String,
}

/// Identity storage. Both calls must be idempotent.
#[async_trait::async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn upsert_chat(&self, chat: &ChatRecord) -> Result<()>;
    async fn upsert_user(&self, user: &UserRecord, chat_id: i64) -> Result<()>;
}

/// Upserts the chat and author of each message, then hands the update to `inner`.
/// Storage failures are logged and never change the outcome of dispatch.
pub struct AutoRegister<H> {
    store: Arc<dyn RegistrationStore>,
    inner: H,
}

impl<H> AutoRegister<H> {
    pub fn new(store: Arc<dyn RegistrationStore>, inner: H) -> Self {
        Self { store, inner }
    }

    async fn register(&self, update: &Update) {
        let Some(message) = &update.message else {
            return;
        };
        let Some(chat) = &message.chat else {
            return;
        };

        let record = ChatRecord {
            id: chat.id,
            name: chat.display_name().to_string(),
        };
        if let Err(err) = self.store.upsert_chat(&record).await {
            error!(chat_id = chat.id, error = %err, "Failed to register chat");
        }

        let Some(from) = message.from.as_ref().filter(|from| !from.is_bot) else {
            return;
        };
        let record = UserRecord {
            id: from.id,
            handle: from.display_name().to_string(),
        };
        if let Err(err) = self.store.upsert_user(&record, chat.id).await {
            error!(
                user_id = from.id,
                chat_id = chat.id,
                error = %err,
                "Failed to register user"
            );
        }
    }
}

#[async_trait::async_trait]
impl<H: Handler> Handler for AutoRegister<H> {
    async fn handle(&self, ctx: &Context, update: &Update) -> Result<()> {
        self.register(update).await;
        self.inner.handle(ctx, update).await
    }
}
