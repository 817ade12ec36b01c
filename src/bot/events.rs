//! Values exchanged with the host chat framework: who sent an event, what
//! the event was, and what the bot wants sent back.

use crate::economy::{ChannelId, GuildId, UserId};

/// Reactions the bot offers as buttons during conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    BlueHeart,
    GreenHeart,
    YellowHeart,
    Cross,
    QuestionMark,
}

impl Reaction {
    pub fn emoji(self) -> &'static str {
        match self {
            Reaction::BlueHeart => "\u{1F499}",
            Reaction::GreenHeart => "\u{1F49A}",
            Reaction::YellowHeart => "\u{1F49B}",
            Reaction::Cross => "\u{2716}",
            Reaction::QuestionMark => "\u{2753}",
        }
    }

    pub fn shortcode(self) -> &'static str {
        match self {
            Reaction::BlueHeart => ":blue_heart:",
            Reaction::GreenHeart => ":green_heart:",
            Reaction::YellowHeart => ":yellow_heart:",
            Reaction::Cross => ":x:",
            Reaction::QuestionMark => ":question:",
        }
    }

    /// Accept either the emoji itself or its shortcode.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_end_matches('\u{FE0F}');
        [
            Reaction::BlueHeart,
            Reaction::GreenHeart,
            Reaction::YellowHeart,
            Reaction::Cross,
            Reaction::QuestionMark,
        ]
        .into_iter()
        .find(|r| r.emoji() == raw || r.shortcode().eq_ignore_ascii_case(raw))
    }
}

/// The member an event came from, as resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub display_name: String,
    /// Whether the host's permission check grants "manage server"
    pub can_manage_guild: bool,
}

impl Invoker {
    pub fn new(guild_id: GuildId, channel_id: ChannelId, user_id: UserId, display_name: &str) -> Self {
        Self {
            guild_id,
            channel_id,
            user_id,
            display_name: display_name.to_string(),
            can_manage_guild: false,
        }
    }

    pub fn as_manager(mut self) -> Self {
        self.can_manage_guild = true;
        self
    }
}

/// Something a member did in a channel the bot can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Message { content: String },
    Reaction(Reaction),
}

impl ChatEvent {
    pub fn message(content: &str) -> Self {
        ChatEvent::Message {
            content: content.to_string(),
        }
    }
}

/// Outgoing message plus the reactions the host should attach to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub reactions: Vec<Reaction>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            reactions: Vec::new(),
        }
    }

    pub fn with_reactions(content: impl Into<String>, reactions: &[Reaction]) -> Self {
        Self {
            content: content.into(),
            reactions: reactions.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reactions_parse_from_emoji_and_shortcode() {
        assert_eq!(Reaction::parse("\u{1F49A}"), Some(Reaction::GreenHeart));
        assert_eq!(Reaction::parse(":X:"), Some(Reaction::Cross));
        assert_eq!(Reaction::parse("\u{2716}\u{FE0F}"), Some(Reaction::Cross));
        assert_eq!(Reaction::parse(":thumbsup:"), None);
    }
}
