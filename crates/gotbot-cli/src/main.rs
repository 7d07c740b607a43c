//! Gotbot CLI
//!
//! Command-line entry point: runs the bot and inspects its configuration

mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gotbot_config::Config;
use gotbot_core::{enabled_commands, Context, Runtime};
use gotbot_storage::Storage;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "gotbot")]
#[command(about = "Telegram chat bot runtime", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (overrides the configured one)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot in the foreground until Ctrl-C
    Start,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// List the commands the bot would register
    Commands,

    /// Show log files
    Logs,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration with the token redacted
    Show,
    /// Check the configuration and report problems
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            let config = Config::resolve(cli.config.as_deref())?;
            let data_dir = config.data_dir();
            fs::create_dir_all(&data_dir)?;

            let log_level = cli
                .log_level
                .clone()
                .unwrap_or_else(|| config.log_level().to_string());
            let _logging_guard = logging::init_logging(&data_dir.join("logs"), &log_level)?;

            let storage = Storage::new(data_dir.join("gotbot.db"))?;
            let runtime = Runtime::new(config, storage)?;

            let ctx = Context::new();
            let shutdown = ctx.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown signal received");
                    shutdown.cancel();
                }
            });

            runtime.run(&ctx).await?;
        }

        Commands::Config { action } => match action {
            ConfigCommands::Show => {
                let mut config = Config::resolve(cli.config.as_deref())?;
                config.telegram.bot_token = redact_token(&config.telegram.bot_token);
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigCommands::Validate => {
                Config::resolve(cli.config.as_deref())?;
                println!("OK");
            }
        },

        Commands::Commands => {
            let config = Config::resolve(cli.config.as_deref())?;
            let commands = enabled_commands(&config);
            if commands.is_empty() {
                println!("No commands enabled");
            }
            for command in commands {
                println!("/{} - {}", command.command, command.description);
            }
        }

        Commands::Logs => {
            let config = Config::resolve(cli.config.as_deref())?;
            let manager = logging::LogManager::new(config.data_dir().join("logs"));
            let files = manager.log_files()?;
            println!(
                "Log files ({} total):",
                logging::LogManager::format_size(manager.total_size()?)
            );
            for file in files {
                let metadata = fs::metadata(&file)?;
                let modified: chrono::DateTime<chrono::Local> = metadata.modified()?.into();
                println!(
                    "  {} ({}, modified {})",
                    file.display(),
                    logging::LogManager::format_size(metadata.len()),
                    modified.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }

    Ok(())
}

/// Keeps the bot id, hides the secret half of the token.
fn redact_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, _)) => format!("{}:***", bot_id),
        None if token.is_empty() => String::new(),
        None => "***".to_string(),
    }
}
