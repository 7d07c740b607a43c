use crate::context::Context;
use crate::decorators::decorate;
use crate::handler::Handler;
use anyhow::Result;
use gotbot_telegram::Update;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Command table. Built once at start-up, then shared read-only behind an `Arc`.
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `action` under `command`, wrapped by [`decorate`]. A later
    /// registration of the same command replaces the earlier one.
    pub fn register<H: Handler + 'static>(&mut self, command: impl Into<String>, action: H) {
        self.routes.insert(command.into(), decorate(action));
    }

    pub fn contains(&self, command: &str) -> bool {
        self.routes.contains_key(command)
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut commands: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        commands.sort_unstable();
        commands
    }
}

#[async_trait::async_trait]
impl Handler for Router {
    async fn handle(&self, ctx: &Context, update: &Update) -> Result<()> {
        let Some(message) = &update.message else {
            return Ok(());
        };

        let command = message.command();
        if command.is_empty() {
            return Ok(());
        }

        match self.routes.get(command) {
            Some(action) => action.handle(ctx, update).await,
            None => {
                info!(update_id = update.update_id, command = command, "Unknown command");
                Ok(())
            }
        }
    }
}
