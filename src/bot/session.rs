//! # Conversations
//!
//! Multi-step setup flows wait for the same member to answer in the same
//! channel. Each step either waits for a message, a reaction, or (while
//! collecting recipe ingredients) whichever comes first. An answer arriving
//! after the prompt timed out gets the step's timeout message instead.

use chrono::{DateTime, Duration, Utc};

use crate::economy::{ChannelId, GuildId, UserId};

use super::events::{Invoker, Reaction};

/// One pending conversation per member per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
}

impl From<&Invoker> for ConversationKey {
    fn from(invoker: &Invoker) -> Self {
        Self {
            guild_id: invoker.guild_id,
            channel_id: invoker.channel_id,
            user_id: invoker.user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationStep {
    /// Which acquire method to set up (💙 / 💚 / 💛 / ✖)
    AcquireChoice { item: String },
    /// A `getitem` method exists: remove it (✖) or alter it (❓)
    CommandExisting { item: String },
    CommandMinimum { item: String },
    CommandMaximum { item: String, minimum: u64 },
    CommandCooldown { item: String, minimum: u64, maximum: u64 },
    RecipeFirstIngredient { item: String },
    /// Another `5 cat` line, or ✖ when done
    RecipeMoreIngredients { item: String, ingredients: Vec<(u64, String)> },
    RecipeOutputAmount { item: String, ingredients: Vec<(u64, String)> },
    CraftAmount { item: String },
}

impl ConversationStep {
    pub fn accepts_messages(&self) -> bool {
        !matches!(
            self,
            ConversationStep::AcquireChoice { .. } | ConversationStep::CommandExisting { .. }
        )
    }

    /// Reactions this step responds to.
    pub fn accepted_reactions(&self) -> &'static [Reaction] {
        match self {
            ConversationStep::AcquireChoice { .. } => &[
                Reaction::BlueHeart,
                Reaction::GreenHeart,
                Reaction::YellowHeart,
                Reaction::Cross,
            ],
            ConversationStep::CommandExisting { .. } => &[Reaction::Cross, Reaction::QuestionMark],
            ConversationStep::RecipeMoreIngredients { .. } => &[Reaction::Cross],
            _ => &[],
        }
    }

    pub fn item(&self) -> &str {
        match self {
            ConversationStep::AcquireChoice { item }
            | ConversationStep::CommandExisting { item }
            | ConversationStep::CommandMinimum { item }
            | ConversationStep::CommandMaximum { item, .. }
            | ConversationStep::CommandCooldown { item, .. }
            | ConversationStep::RecipeFirstIngredient { item }
            | ConversationStep::RecipeMoreIngredients { item, .. }
            | ConversationStep::RecipeOutputAmount { item, .. }
            | ConversationStep::CraftAmount { item } => item,
        }
    }

    pub fn timeout_message(&self) -> &'static str {
        match self {
            ConversationStep::AcquireChoice { .. } => {
                "Timed out setting up an item acquirement method - please try again later."
            }
            ConversationStep::CommandExisting { .. }
            | ConversationStep::CommandMinimum { .. }
            | ConversationStep::CommandMaximum { .. }
            | ConversationStep::CommandCooldown { .. } => {
                "Timed out setting up an item acquirement via command - please try again later."
            }
            ConversationStep::RecipeFirstIngredient { .. }
            | ConversationStep::RecipeMoreIngredients { .. }
            | ConversationStep::RecipeOutputAmount { .. } => {
                "Timed out setting up an item acquirement via crafting - please try again later."
            }
            ConversationStep::CraftAmount { .. } => {
                "Timed out waiting for a craft amount - please try again later."
            }
        }
    }
}

/// Saturates at the latest representable time instead of overflowing.
fn deadline(now: DateTime<Utc>, timeout: Duration) -> DateTime<Utc> {
    now.checked_add_signed(timeout)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub step: ConversationStep,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(step: ConversationStep, now: DateTime<Utc>, timeout: Duration) -> Self {
        Self {
            step,
            started_at: now,
            expires_at: deadline(now, timeout),
        }
    }

    /// Move to the next step. Every prompt restarts the timeout.
    pub fn advance(&mut self, step: ConversationStep, now: DateTime<Utc>, timeout: Duration) {
        self.step = step;
        self.expires_at = deadline(now, timeout);
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
