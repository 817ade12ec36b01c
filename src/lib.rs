//! # Guildcraft - per-guild item economy for chat bots
//!
//! Guildcraft keeps an item economy for each guild (server) of a chat
//! platform. Managers define items and how members obtain them; members
//! collect items with a cooldown-limited command and craft new items from
//! recipes.
//!
//! ## Features
//!
//! - **Items**: guild-scoped item names, created once and never duplicated.
//! - **Inventories**: per-member item counts persisted in sled.
//! - **Acquisition**: a `getitem` command granting a random amount in a configured range, limited by a cooldown.
//! - **Crafting**: recipes consuming ingredients atomically, with the first short ingredient reported.
//! - **Conversations**: reaction and message driven setup flows with prompt timeouts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use guildcraft::bot::{ChatEvent, Invoker, ItemCommandProcessor};
//! use guildcraft::config::Config;
//! use guildcraft::economy::{ChannelId, EconomyStore, GuildId, UserId};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = EconomyStore::open(config.storage.economy_db_path())?;
//!     let mut processor = ItemCommandProcessor::new(store, &config);
//!
//!     let member = Invoker::new(GuildId(1), ChannelId(1), UserId(7), "kae");
//!     for reply in processor.handle_event(&member, &ChatEvent::message("!inventory")) {
//!         println!("{}", reply.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`economy`] - data model, crafting resolution, acquisition rules and the sled store
//! - [`bot`] - command parsing, conversations and reply generation
//! - [`config`] - configuration loading and validation
//! - [`validation`] - input cleaning, item names, amounts and time values
//! - [`logutil`] - log-safe previews of user text

pub mod bot;
pub mod config;
pub mod economy;
pub mod logutil;
pub mod validation;
