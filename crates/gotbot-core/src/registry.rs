use crate::auto_register::{ChatRecord, RegistrationStore, UserRecord};
use anyhow::Result;
use gotbot_storage::Storage;
use std::sync::Arc;
use tokio::sync::Mutex;

/// [`RegistrationStore`] backed by the SQLite identity tables.
#[derive(Clone)]
pub struct SqliteRegistry {
    storage: Arc<Mutex<Storage>>,
}

impl SqliteRegistry {
    pub fn new(storage: Storage) -> Self {
        Self::from_shared(Arc::new(Mutex::new(storage)))
    }

    pub fn from_shared(storage: Arc<Mutex<Storage>>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> Arc<Mutex<Storage>> {
        Arc::clone(&self.storage)
    }
}

#[async_trait::async_trait]
impl RegistrationStore for SqliteRegistry {
    async fn upsert_chat(&self, chat: &ChatRecord) -> Result<()> {
        let storage = self.storage.lock().await;
        storage.upsert_chat(chat.id, &chat.name)
    }

    async fn upsert_user(&self, user: &UserRecord, chat_id: i64) -> Result<()> {
        let storage = self.storage.lock().await;
        storage.upsert_user(user.id, &user.handle)?;
        storage.add_user_to_chat(user.id, chat_id)
    }
}
