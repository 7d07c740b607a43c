use crate::actions::{describe, HelpAction, StartAction};
use crate::auto_register::AutoRegister;
use crate::context::Context;
use crate::dispatcher::{Bot, DispatchMode};
use crate::handler::Handler;
use crate::keep_alive::KeepAliveFactory;
use crate::registry::SqliteRegistry;
use crate::router::Router;
use crate::transport::ChatSink;
use anyhow::Result;
use gotbot_config::Config;
use gotbot_storage::Storage;
use gotbot_telegram::{BotCommand, TelegramClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Built-in commands that survive the disabled list, under their configured names.
pub fn enabled_commands(config: &Config) -> Vec<BotCommand> {
    config
        .commands
        .entries()
        .into_iter()
        .filter(|(_, name)| !config.is_disabled(name))
        .map(|(key, name)| BotCommand::new(name, describe(key)))
        .collect()
}

/// Registers `action` unless `command` is disabled. Returns whether it was registered.
pub fn register_command<H: Handler + 'static>(
    router: &mut Router,
    config: &Config,
    command: &str,
    action: H,
) -> bool {
    if config.is_disabled(command) {
        info!(command = command, "Command disabled, not registering");
        return false;
    }
    router.register(command, action);
    true
}

pub struct Runtime {
    client: Arc<TelegramClient>,
    bot: Bot,
    commands: Vec<BotCommand>,
    keep_alive: KeepAliveFactory,
    sync_commands: bool,
}

impl Runtime {
    pub fn new(config: Config, storage: Storage) -> Result<Self> {
        let telegram = &config.telegram;
        let client = Arc::new(
            TelegramClient::new(telegram.bot_token.as_str())?
                .with_base_url(&telegram.api_url)
                .with_poll_timeout(telegram.poll_timeout_secs),
        );
        let sink: Arc<dyn ChatSink> = client.clone();
        let commands = enabled_commands(&config);
        let keep_alive = KeepAliveFactory::new(
            Arc::clone(&sink),
            Duration::from_secs(telegram.keep_alive_interval_secs),
        );

        let mut router = Router::new();
        register_command(
            &mut router,
            &config,
            &config.commands.start,
            StartAction::new(Arc::clone(&sink)),
        );
        register_command(
            &mut router,
            &config,
            &config.commands.help,
            HelpAction::new(Arc::clone(&sink), commands.clone()),
        );

        let registry = Arc::new(SqliteRegistry::new(storage));
        let handler: Arc<dyn Handler> = Arc::new(AutoRegister::new(registry, router));

        let bot = Bot::new(client.clone(), handler)
            .with_interval(Duration::from_millis(telegram.poll_interval_ms))
            .with_mode(DispatchMode::from(telegram.max_concurrent_updates));

        Ok(Self {
            client,
            bot,
            commands,
            keep_alive,
            sync_commands: telegram.sync_commands,
        })
    }

    pub fn commands(&self) -> &[BotCommand] {
        &self.commands
    }

    /// Keep-alive sessions for this bot, repeating at `keep_alive_interval_secs`.
    pub fn keep_alive(&self) -> &KeepAliveFactory {
        &self.keep_alive
    }

    /// Publishes the command menu, then polls until `ctx` is cancelled.
    pub async fn run(mut self, ctx: &Context) -> Result<()> {
        if self.sync_commands {
            match self.client.set_my_commands(&self.commands).await {
                Ok(()) => info!(count = self.commands.len(), "Bot commands synced"),
                Err(err) => warn!(error = %err, "Failed to sync bot commands"),
            }
        }

        info!(bot_id = self.client.bot_id(), "Bot started");
        self.bot.start(ctx).await;
        info!("Bot stopped");
        Ok(())
    }
}
