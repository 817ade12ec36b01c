//! Parsing of prefixed chat commands into [`ItemCommand`]s.

/// Item commands a member can invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemCommand {
    Inventory(Option<String>),   // inventory [user], inv, i
    GetItem(String),             // getitem <item>
    CreateItem(String),          // createitem <item>
    AcquireItem(String),         // acquireitem <item>
    Craft {                      // craft <item> [amount]
        item: String,
        amount: Option<i64>,
    },
    Recipe(String),              // recipe <item>
    Help,

    /// `craft <item> <count>` where the count does not fit in an i64
    CraftTooMany(String),

    /// Known command invoked without its required argument
    MissingArgument(&'static str),
    Unknown(String),
}

impl ItemCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ItemCommand::Inventory(_) => "inventory",
            ItemCommand::GetItem(_) => "getitem",
            ItemCommand::CreateItem(_) => "createitem",
            ItemCommand::AcquireItem(_) => "acquireitem",
            ItemCommand::Craft { .. } | ItemCommand::CraftTooMany(_) => "craft",
            ItemCommand::Recipe(_) => "recipe",
            ItemCommand::Help => "help",
            ItemCommand::MissingArgument(name) => *name,
            ItemCommand::Unknown(_) => "unknown",
        }
    }
}

/// Parse a chat message. Returns `None` when it is not addressed to the bot.
pub fn parse_command(content: &str, prefix: &str) -> Option<ItemCommand> {
    let body = content.trim_start().strip_prefix(prefix)?;
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let (verb, rest) = match body.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (body, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match verb.to_lowercase().as_str() {
        "inventory" | "inv" | "i" => ItemCommand::Inventory(argument),
        "getitem" => argument.map_or(ItemCommand::MissingArgument("getitem"), ItemCommand::GetItem),
        "createitem" => argument.map_or(
            ItemCommand::MissingArgument("createitem"),
            ItemCommand::CreateItem,
        ),
        "acquireitem" => argument.map_or(
            ItemCommand::MissingArgument("acquireitem"),
            ItemCommand::AcquireItem,
        ),
        "craft" | "craftitem" => match argument {
            Some(arg) => parse_craft_arguments(&arg),
            None => ItemCommand::MissingArgument("craft"),
        },
        "recipe" => argument.map_or(ItemCommand::MissingArgument("recipe"), ItemCommand::Recipe),
        "help" | "commands" => ItemCommand::Help,
        other => ItemCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// `pizza slice 3` crafts three pizza slices; a lone number is an item name.
fn parse_craft_arguments(arg: &str) -> ItemCommand {
    if let Some((item, last)) = arg.rsplit_once(char::is_whitespace) {
        let item = item.trim().to_string();
        let digits = last.strip_prefix('-').unwrap_or(last);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return match last.parse::<i64>() {
                Ok(amount) => ItemCommand::Craft {
                    item,
                    amount: Some(amount),
                },
                // Out of range below zero is still a non-positive request
                Err(_) if last.starts_with('-') => ItemCommand::Craft {
                    item,
                    amount: Some(i64::MIN),
                },
                Err(_) => ItemCommand::CraftTooMany(item),
            };
        }
    }
    ItemCommand::Craft {
        item: arg.to_string(),
        amount: None,
    }
}

/// Usage line for a command name.
pub fn usage(name: &str, prefix: &str) -> String {
    let args = match name {
        "inventory" => " [user]",
        "getitem" | "createitem" | "acquireitem" | "recipe" => " <item>",
        "craft" => " <item> [amount]",
        _ => "",
    };
    format!("Usage: `{}{}{}`", prefix, name, args)
}

/// Help text listing every command.
pub fn help_text(prefix: &str) -> String {
    [
        format!("`{p}inventory [user]` - show what someone is holding (aliases `{p}inv`, `{p}i`)", p = prefix),
        format!("`{}getitem <item>` - grab some of an item, if the server allows it", prefix),
        format!("`{}craft <item> [amount]` - craft an item from its recipe", prefix),
        format!("`{}recipe <item>` - show what an item is crafted from", prefix),
        format!("`{}createitem <item>` - define a new item (managers)", prefix),
        format!("`{}acquireitem <item>` - set up how an item is obtained (managers)", prefix),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprefixed_messages_are_ignored() {
        assert_eq!(parse_command("getitem cat", "!"), None);
        assert_eq!(parse_command("!", "!"), None);
    }

    #[test]
    fn verbs_are_case_insensitive_and_aliased() {
        assert_eq!(parse_command("!INV", "!"), Some(ItemCommand::Inventory(None)));
        assert_eq!(
            parse_command("!i <@42>", "!"),
            Some(ItemCommand::Inventory(Some("<@42>".to_string())))
        );
        assert_eq!(
            parse_command("  !GetItem  Pizza Slice ", "!"),
            Some(ItemCommand::GetItem("Pizza Slice".to_string()))
        );
    }

    #[test]
    fn missing_arguments_are_reported() {
        assert_eq!(
            parse_command("!createitem", "!"),
            Some(ItemCommand::MissingArgument("createitem"))
        );
        assert_eq!(usage("craft", "!"), "Usage: `!craft <item> [amount]`");
    }

    #[test]
    fn craft_takes_a_trailing_amount() {
        assert_eq!(
            parse_command("!craft pizza slice 3", "!"),
            Some(ItemCommand::Craft {
                item: "pizza slice".to_string(),
                amount: Some(3)
            })
        );
        assert_eq!(
            parse_command("!craftitem widget", "!"),
            Some(ItemCommand::Craft {
                item: "widget".to_string(),
                amount: None
            })
        );
        assert_eq!(
            parse_command("!craft widget -1", "!"),
            Some(ItemCommand::Craft {
                item: "widget".to_string(),
                amount: Some(-1)
            })
        );
    }

    #[test]
    fn oversized_craft_counts_stay_counts() {
        assert_eq!(
            parse_command("!craft widget 99999999999999999999", "!"),
            Some(ItemCommand::CraftTooMany("widget".to_string()))
        );
        assert_eq!(
            parse_command("!craft widget -99999999999999999999", "!"),
            Some(ItemCommand::Craft {
                item: "widget".to_string(),
                amount: Some(i64::MIN)
            })
        );
        // Not all digits: still part of the name
        assert_eq!(
            parse_command("!craft widget 9x", "!"),
            Some(ItemCommand::Craft {
                item: "widget 9x".to_string(),
                amount: None
            })
        );
    }

    #[test]
    fn multi_character_prefix() {
        assert_eq!(parse_command("gc!help", "gc!"), Some(ItemCommand::Help));
        assert_eq!(
            parse_command("gc!dance", "gc!"),
            Some(ItemCommand::Unknown("dance".to_string()))
        );
    }
}
