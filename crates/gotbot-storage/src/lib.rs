//! Gotbot Storage
//!
//! SQLite persistence for the chats and users the bot has seen

use anyhow::Result;
use rusqlite::OptionalExtension;
use std::path::Path;

pub struct Storage {
    conn: rusqlite::Connection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChat {
    pub chat_id: i64,
    pub chat_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub user_id: i64,
    pub username: String,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = rusqlite::Connection::open(db_path.as_ref())?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(rusqlite::Connection::open_in_memory()?)
    }

    fn init(conn: rusqlite::Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS chats (
                chat_id INTEGER PRIMARY KEY,
                chat_name TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS chat_users (
                chat_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                joined_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (chat_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_chat_users_user
            ON chat_users(user_id);
            ",
        )?;

        Ok(Self { conn })
    }

    pub fn upsert_chat(&self, chat_id: i64, chat_name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO chats (chat_id, chat_name)
             VALUES (?1, ?2)
             ON CONFLICT(chat_id)
             DO UPDATE SET chat_name = excluded.chat_name, updated_at = CURRENT_TIMESTAMP",
            (chat_id, chat_name),
        )?;
        Ok(())
    }

    pub fn upsert_user(&self, user_id: i64, username: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (user_id, username)
             VALUES (?1, ?2)
             ON CONFLICT(user_id)
             DO UPDATE SET username = excluded.username, updated_at = CURRENT_TIMESTAMP",
            (user_id, username),
        )?;
        Ok(())
    }

    pub fn add_user_to_chat(&self, user_id: i64, chat_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO chat_users (chat_id, user_id) VALUES (?1, ?2)",
            (chat_id, user_id),
        )?;
        Ok(())
    }

    pub fn get_chat(&self, chat_id: i64) -> Result<Option<StoredChat>> {
        let mut stmt = self
            .conn
            .prepare("SELECT chat_id, chat_name FROM chats WHERE chat_id = ?1")?;
        let chat = stmt
            .query_row([chat_id], |row| {
                Ok(StoredChat {
                    chat_id: row.get(0)?,
                    chat_name: row.get(1)?,
                })
            })
            .optional()?;
        Ok(chat)
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<StoredUser>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, username FROM users WHERE user_id = ?1")?;
        let user = stmt
            .query_row([user_id], |row| {
                Ok(StoredUser {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                })
            })
            .optional()?;
        Ok(user)
    }

    pub fn list_chat_users(&self, chat_id: i64) -> Result<Vec<StoredUser>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.user_id, u.username
             FROM chat_users cu
             JOIN users u ON u.user_id = cu.user_id
             WHERE cu.chat_id = ?1
             ORDER BY u.user_id",
        )?;

        let users = stmt.query_map([chat_id], |row| {
            Ok(StoredUser {
                user_id: row.get(0)?,
                username: row.get(1)?,
            })
        })?;

        let mut result = Vec::new();
        for user in users {
            result.push(user?);
        }
        Ok(result)
    }

    pub fn count_chats(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0))?;
        Ok(count)
    }
}
