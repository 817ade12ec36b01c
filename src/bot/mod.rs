//! # Conversational item commands
//!
//! The host chat framework resolves who sent an event and hands it to the
//! [`ItemCommandProcessor`], which answers with [`Reply`] values and keeps
//! track of setup conversations that span several messages or reactions.

pub mod commands;
pub mod events;
pub mod processor;
pub mod session;

pub use commands::{help_text, parse_command, usage, ItemCommand};
pub use events::{ChatEvent, Invoker, Reaction, Reply};
pub use processor::ItemCommandProcessor;
pub use session::{Conversation, ConversationKey, ConversationStep};
