//! Gotbot Configuration
//!
//! TOML configuration loading with environment variable overrides

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_KEEP_ALIVE_INTERVAL_SECS: u64 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    pub data_dir: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_keep_alive_interval_secs")]
    pub keep_alive_interval_secs: u64,
    /// Cap on in-flight updates. Absent means one task per update with no limit.
    #[serde(default)]
    pub max_concurrent_updates: Option<usize>,
    #[serde(default = "default_true")]
    pub sync_commands: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_api_url(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_secs: default_poll_timeout_secs(),
            keep_alive_interval_secs: default_keep_alive_interval_secs(),
            max_concurrent_updates: None,
            sync_commands: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default = "default_cmd_start")]
    pub start: String,
    #[serde(default = "default_cmd_help")]
    pub help: String,
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            start: default_cmd_start(),
            help: default_cmd_help(),
            disabled: Vec::new(),
        }
    }
}

impl CommandsConfig {
    /// Built-in command keys paired with their configured names.
    pub fn entries(&self) -> [(&'static str, &str); 2] {
        [("start", self.start.as_str()), ("help", self.help.as_str())]
    }

    fn name_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "start" => Some(&mut self.start),
            "help" => Some(&mut self.help),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_poll_timeout_secs() -> u64 {
    DEFAULT_POLL_TIMEOUT_SECS
}

fn default_keep_alive_interval_secs() -> u64 {
    DEFAULT_KEEP_ALIVE_INTERVAL_SECS
}

fn default_cmd_start() -> String {
    "start".to_string()
}

fn default_cmd_help() -> String {
    "help".to_string()
}

/// Accepts `true`, `1` and `yes` in any case.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads the file at `path`, or the default path if present, then applies
    /// environment overrides and validates the result.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path).map_err(|e| {
                anyhow::anyhow!("failed to load config {}: {}", path.display(), e)
            })?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default_path) => Self::load(&default_path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gotbot").join("config.toml"))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides using `lookup` as the variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = lookup("BOT_TOKEN") {
            self.telegram.bot_token = token.trim().to_string();
        }
        if let Some(api_url) = lookup("BOT_API_URL") {
            self.telegram.api_url = api_url.trim().to_string();
        }
        if let Some(level) = lookup("BOT_LOG_LEVEL") {
            self.core.log_level = Some(level.trim().to_string());
        }

        for key in ["start", "help"] {
            let env_key = key.to_ascii_uppercase();
            if let Some(name) = lookup(&format!("CMD_{}", env_key)) {
                if let Some(slot) = self.commands.name_mut(key) {
                    *slot = name.trim().to_string();
                }
            }
        }

        // Runs after renames so the disabled entry matches the routed name.
        for key in ["start", "help"] {
            let env_key = key.to_ascii_uppercase();
            let disabled = lookup(&format!("DISABLE_CMD_{}", env_key))
                .map(|value| is_truthy(&value))
                .unwrap_or(false);
            if !disabled {
                continue;
            }
            let name = self
                .commands
                .entries()
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, name)| name.to_string());
            if let Some(name) = name {
                if !self.commands.disabled.contains(&name) {
                    self.commands.disabled.push(name);
                }
            }
        }
    }

    pub fn is_disabled(&self, command: &str) -> bool {
        self.commands.disabled.iter().any(|name| name == command)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("telegram.bot_token is required (or set BOT_TOKEN)");
        }
        if self.telegram.poll_interval_ms == 0 {
            anyhow::bail!("telegram.poll_interval_ms must be greater than zero");
        }
        if self.telegram.keep_alive_interval_secs == 0 {
            anyhow::bail!("telegram.keep_alive_interval_secs must be greater than zero");
        }
        if self.telegram.max_concurrent_updates == Some(0) {
            anyhow::bail!("telegram.max_concurrent_updates must be greater than zero when set");
        }

        let mut seen = HashSet::new();
        for (key, name) in self.commands.entries() {
            if name.is_empty() {
                anyhow::bail!("Command name for '{}' cannot be empty", key);
            }
            if name.contains('/') || name.contains('@') || name.chars().any(char::is_whitespace)
            {
                anyhow::bail!("Command name '{}' contains '/', '@' or whitespace", name);
            }
            if !seen.insert(name) {
                anyhow::bail!("Duplicate command name '{}'", name);
            }
        }

        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        match self.core.data_dir.as_deref() {
            Some("~") => home(),
            Some(dir) if dir.starts_with("~/") => home().join(dir.trim_start_matches("~/")),
            Some(dir) => PathBuf::from(dir),
            None => home().join(".gotbot"),
        }
    }

    pub fn log_level(&self) -> &str {
        self.core.log_level.as_deref().unwrap_or("info")
    }
}
