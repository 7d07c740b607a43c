//! In-process fakes for the ports, shared by the unit tests.

use crate::context::Context;
use crate::handler::Handler;
use crate::transport::{ChatSink, UpdateSource};
use anyhow::{anyhow, Result};
use gotbot_telegram::{Chat, ChatAction, Message, Update, User};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub fn command_update(update_id: i64, chat_id: i64, text: &str) -> Update {
    Update {
        update_id,
        message: Some(Message {
            message_id: update_id,
            from: Some(User {
                id: 1000 + chat_id,
                is_bot: false,
                first_name: format!("First{}", chat_id),
                username: format!("user{}", chat_id),
            }),
            chat: Some(Chat {
                id: chat_id,
                kind: "group".to_string(),
                title: format!("Chat {}", chat_id),
            }),
            text: text.to_string(),
            reply_to_message: None,
            sticker: None,
        }),
    }
}

/// Records the update id of every call.
#[derive(Clone, Default)]
pub struct Recording {
    seen: Arc<Mutex<Vec<i64>>>,
}

impl Recording {
    pub fn seen(&self) -> Vec<i64> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Handler for Recording {
    async fn handle(&self, _ctx: &Context, update: &Update) -> Result<()> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(update.update_id);
        }
        Ok(())
    }
}

pub struct Failing(pub &'static str);

#[async_trait::async_trait]
impl Handler for Failing {
    async fn handle(&self, _ctx: &Context, _update: &Update) -> Result<()> {
        Err(anyhow!(self.0))
    }
}

pub struct Panicking;

#[async_trait::async_trait]
impl Handler for Panicking {
    async fn handle(&self, _ctx: &Context, update: &Update) -> Result<()> {
        panic!("action for update {} blew up", update.update_id);
    }
}

/// Collects everything sent to chats; optionally fails every send.
#[derive(Default)]
pub struct FakeSink {
    pub fail: bool,
    texts: Mutex<Vec<(i64, String)>>,
    actions: Mutex<Vec<(i64, ChatAction)>>,
}

impl FakeSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<(i64, String)> {
        self.texts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn actions(&self) -> Vec<(i64, ChatAction)> {
        self.actions.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn action_count(&self) -> usize {
        self.actions.lock().map(|a| a.len()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ChatSink for FakeSink {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("sink offline"));
        }
        if let Ok(mut texts) = self.texts.lock() {
            texts.push((chat_id, text.to_string()));
        }
        Ok(())
    }

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<()> {
        // Failed attempts still count, so tests can see the loop kept trying.
        if let Ok(mut actions) = self.actions.lock() {
            actions.push((chat_id, action));
        }
        if self.fail {
            return Err(anyhow!("sink offline"));
        }
        Ok(())
    }
}

/// Replays scripted fetch results and remembers the offsets it was asked for.
#[derive(Default)]
pub struct ScriptedSource {
    batches: Mutex<VecDeque<Result<Vec<Update>>>>,
    offsets: Mutex<Vec<i64>>,
}

impl ScriptedSource {
    pub fn new(batches: Vec<Result<Vec<Update>>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            offsets: Mutex::new(Vec::new()),
        }
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl UpdateSource for ScriptedSource {
    async fn fetch_updates(&self, offset: i64) -> Result<Vec<Update>> {
        if let Ok(mut offsets) = self.offsets.lock() {
            offsets.push(offset);
        }
        let next = self
            .batches
            .lock()
            .map_err(|_| anyhow!("script poisoned"))?
            .pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}
