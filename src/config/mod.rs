//! # Configuration
//!
//! TOML configuration for the bot: command prefix, prompt timeouts, where
//! the economy store lives and how logging is set up.
//!
//! ```toml
//! [bot]
//! name = "guildcraft"
//! command_prefix = "!"
//! prompt_timeout_secs = 120
//! max_item_name_len = 64
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "guildcraft.log"
//! ```
//!
//! `guildcraft init` writes this file with defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::validation::DEFAULT_MAX_ITEM_NAME_LEN;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    /// Prefix that marks a message as a command, e.g. `!getitem cat`.
    pub command_prefix: String,
    /// How long a conversation waits for the next reply or reaction.
    #[serde(default = "default_prompt_timeout_secs")]
    pub prompt_timeout_secs: u64,
    #[serde(default = "default_max_item_name_len")]
    pub max_item_name_len: usize,
}

/// Longest a conversation may wait for an answer (one day).
pub const MAX_PROMPT_TIMEOUT_SECS: u64 = 86_400;

fn default_prompt_timeout_secs() -> u64 {
    120
}

fn default_max_item_name_len() -> usize {
    DEFAULT_MAX_ITEM_NAME_LEN
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the sled database path; defaults to `<data_dir>/economy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn economy_db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.data_dir).join("economy"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl LoggingConfig {
    /// Parsed level; unknown strings fall back to `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the command layer cannot work with.
    pub fn validate(&self) -> Result<()> {
        let prefix = self.bot.command_prefix.trim();
        if prefix.is_empty() {
            return Err(anyhow!("bot.command_prefix must not be empty"));
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(anyhow!("bot.command_prefix must not contain whitespace"));
        }
        if self.bot.prompt_timeout_secs == 0 {
            return Err(anyhow!("bot.prompt_timeout_secs must be at least 1"));
        }
        if self.bot.prompt_timeout_secs > MAX_PROMPT_TIMEOUT_SECS {
            return Err(anyhow!(
                "bot.prompt_timeout_secs must be at most {}",
                MAX_PROMPT_TIMEOUT_SECS
            ));
        }
        if self.bot.max_item_name_len == 0 {
            return Err(anyhow!("bot.max_item_name_len must be at least 1"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "guildcraft".to_string(),
                command_prefix: "!".to_string(),
                prompt_timeout_secs: default_prompt_timeout_secs(),
                max_item_name_len: default_max_item_name_len(),
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                db_path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("guildcraft.log".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bot.command_prefix, "!");
        assert_eq!(config.bot.prompt_timeout_secs, 120);
        assert_eq!(
            config.storage.economy_db_path(),
            PathBuf::from("./data").join("economy")
        );
    }

    #[test]
    fn db_path_override_wins() {
        let mut config = Config::default();
        config.storage.db_path = Some("/var/lib/guildcraft".to_string());
        assert_eq!(
            config.storage.economy_db_path(),
            PathBuf::from("/var/lib/guildcraft")
        );
    }

    #[test]
    fn optional_bot_fields_default_when_missing() {
        let text = r#"
            [bot]
            name = "test"
            command_prefix = "?"

            [storage]
            data_dir = "/tmp/x"

            [logging]
            level = "debug"
        "#;
        let config: Config = toml::from_str(text).expect("parse");
        assert_eq!(config.bot.prompt_timeout_secs, 120);
        assert_eq!(config.bot.max_item_name_len, DEFAULT_MAX_ITEM_NAME_LEN);
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Debug);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn bad_prefix_is_rejected() {
        let mut config = Config::default();
        config.bot.command_prefix = "  ".to_string();
        assert!(config.validate().is_err());
        config.bot.command_prefix = "! ".to_string();
        assert!(config.validate().is_ok());
        config.bot.command_prefix = "a b".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn prompt_timeout_is_bounded() {
        let mut config = Config::default();
        config.bot.prompt_timeout_secs = MAX_PROMPT_TIMEOUT_SECS;
        assert!(config.validate().is_ok());
        config.bot.prompt_timeout_secs = MAX_PROMPT_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
        config.bot.prompt_timeout_secs = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 86400"), "{}", err);
    }

    #[test]
    fn toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.bot.name, config.bot.name);
        assert_eq!(parsed.logging.file, config.logging.file);
    }
}
