//! Gotbot Telegram Adapter
//!
//! Bot API wire types, slash-command parsing and a long-polling HTTP client
//! with message chunking and Markdown fallback

pub mod client;
pub mod command;
pub mod types;

pub use client::{chunk_message, TelegramClient, TelegramError};
pub use command::parse_command;
pub use types::{BotCommand, Chat, ChatAction, Message, Sticker, Update, User};
