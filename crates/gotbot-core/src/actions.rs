//! Built-in actions: the greeting and the command list.

use crate::context::Context;
use crate::handler::Handler;
use crate::transport::ChatSink;
use anyhow::Result;
use gotbot_telegram::{BotCommand, Update};
use std::sync::Arc;

pub const WELCOME_TEXT: &str = "Welcome! I am ready.";
const HELP_HEADER: &str = "*Available commands:*\n";

/// Menu description for a built-in command key.
pub fn describe(key: &str) -> &'static str {
    match key {
        "start" => "Start the bot",
        "help" => "Show available commands",
        _ => "",
    }
}

fn chat_id(update: &Update) -> Option<i64> {
    update.message.as_ref()?.chat.as_ref().map(|chat| chat.id)
}

pub struct StartAction {
    sink: Arc<dyn ChatSink>,
}

impl StartAction {
    pub fn new(sink: Arc<dyn ChatSink>) -> Self {
        Self { sink }
    }
}

#[async_trait::async_trait]
impl Handler for StartAction {
    async fn handle(&self, _ctx: &Context, update: &Update) -> Result<()> {
        let Some(chat_id) = chat_id(update) else {
            return Ok(());
        };
        self.sink.send_text(chat_id, WELCOME_TEXT).await
    }
}

pub struct HelpAction {
    sink: Arc<dyn ChatSink>,
    commands: Vec<BotCommand>,
}

impl HelpAction {
    pub fn new(sink: Arc<dyn ChatSink>, commands: Vec<BotCommand>) -> Self {
        Self { sink, commands }
    }

    pub fn render(&self) -> String {
        let mut text = String::from(HELP_HEADER);
        for command in &self.commands {
            text.push_str(&format!("/{} - {}\n", command.command, command.description));
        }
        text
    }
}

#[async_trait::async_trait]
impl Handler for HelpAction {
    async fn handle(&self, _ctx: &Context, update: &Update) -> Result<()> {
        let Some(chat_id) = chat_id(update) else {
            return Ok(());
        };
        self.sink.send_text(chat_id, &self.render()).await
    }
}
