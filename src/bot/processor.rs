//! Item command processor.
//!
//! Turns host events into replies: parses commands, runs the multi-step
//! setup conversations and talks to the [`EconomyStore`].

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Config, MAX_PROMPT_TIMEOUT_SECS};
use crate::economy::{
    format_amount, format_inventory_lines, format_recipe, get_acquire_amount, max_craftable,
    normalize_range, AcquireKind, AcquireMethod, CooldownKey, CooldownTracker, CraftingRecipe,
    EconomyError, EconomyStore, InMemoryCooldowns, UserId,
};
use crate::logutil::escape_log;
use crate::validation::{
    clean_content, clean_item_name, parse_amount, parse_count, parse_ingredient_line,
    parse_user_reference, TimeValue, ValidationError,
};

use super::commands::{help_text, parse_command, usage, ItemCommand};
use super::events::{ChatEvent, Invoker, Reaction, Reply};
use super::session::{Conversation, ConversationKey, ConversationStep};

const STORE_FAILURE: &str = "Something went wrong talking to the item database - please try again later.";
const TOO_MANY_TO_CRAFT: &str = "That's too many to craft at once.";
const NEEDS_MANAGE_GUILD: &str = "You need the `Manage Server` permission to run this command.";

/// Result of one conversation step: replies plus the next step, if any.
struct StepResult {
    replies: Vec<Reply>,
    next: Option<ConversationStep>,
}

impl StepResult {
    fn done(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            next: None,
        }
    }

    fn ask(reply: Reply, next: ConversationStep) -> Self {
        Self {
            replies: vec![reply],
            next: Some(next),
        }
    }
}

pub struct ItemCommandProcessor {
    store: EconomyStore,
    cooldowns: Box<dyn CooldownTracker>,
    conversations: HashMap<ConversationKey, Conversation>,
    rng: StdRng,
    prefix: String,
    prompt_timeout: Duration,
    max_item_name_len: usize,
}

impl ItemCommandProcessor {
    pub fn new(store: EconomyStore, config: &Config) -> Self {
        // Bounded by MAX_PROMPT_TIMEOUT_SECS, so the cast cannot wrap.
        let timeout_secs = config.bot.prompt_timeout_secs.min(MAX_PROMPT_TIMEOUT_SECS) as i64;
        Self {
            store,
            cooldowns: Box::new(InMemoryCooldowns::new()),
            conversations: HashMap::new(),
            rng: StdRng::from_entropy(),
            prefix: config.bot.command_prefix.trim().to_string(),
            prompt_timeout: Duration::seconds(timeout_secs),
            max_item_name_len: config.bot.max_item_name_len,
        }
    }

    /// Replace the process-local cooldown map.
    pub fn with_cooldowns(mut self, cooldowns: Box<dyn CooldownTracker>) -> Self {
        self.cooldowns = cooldowns;
        self
    }

    /// Deterministic amounts for `getitem`.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn store(&self) -> &EconomyStore {
        &self.store
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Conversations still waiting for an answer.
    pub fn pending_conversations(&self) -> usize {
        self.conversations.len()
    }

    pub fn handle_event(&mut self, invoker: &Invoker, event: &ChatEvent) -> Vec<Reply> {
        self.handle_event_at(invoker, event, Utc::now())
    }

    /// Process one event as if it arrived at `now`.
    pub fn handle_event_at(
        &mut self,
        invoker: &Invoker,
        event: &ChatEvent,
        now: DateTime<Utc>,
    ) -> Vec<Reply> {
        let key = ConversationKey::from(invoker);
        let mut replies = Vec::new();

        if let Some(convo) = self.conversations.get(&key) {
            if convo.is_expired(now) {
                info!(
                    "Timed out {:?} for '{}' in {}",
                    convo.step,
                    convo.step.item(),
                    invoker.guild_id
                );
                replies.push(Reply::text(convo.step.timeout_message()));
                self.conversations.remove(&key);
            }
        }

        if let Some(convo) = self.conversations.get(&key) {
            let consumed = match event {
                ChatEvent::Message { .. } => convo.step.accepts_messages(),
                ChatEvent::Reaction(reaction) => convo.step.accepted_reactions().contains(reaction),
            };
            if consumed {
                let step = convo.step.clone();
                let result = self.continue_conversation(invoker, step, event);
                replies.extend(result.replies);
                match result.next {
                    Some(next) => {
                        if let Some(convo) = self.conversations.get_mut(&key) {
                            convo.advance(next, now, self.prompt_timeout);
                        }
                    }
                    None => {
                        self.conversations.remove(&key);
                    }
                }
                return replies;
            }
        }

        if let ChatEvent::Message { content } = event {
            if let Some(command) = parse_command(content, &self.prefix) {
                debug!(
                    "Item command parsed: guild={} user={} command={:?} raw={}",
                    invoker.guild_id,
                    invoker.user_id,
                    command.name(),
                    escape_log(content)
                );
                let result = self.run_command(invoker, command, now);
                replies.extend(result.replies);
                if let Some(step) = result.next {
                    self.conversations
                        .insert(key, Conversation::new(step, now, self.prompt_timeout));
                }
            }
        }
        replies
    }

    /// Drop every conversation whose prompt has timed out, returning the
    /// timeout notice for each so the host can deliver it.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> Vec<(ConversationKey, Reply)> {
        let expired: Vec<ConversationKey> = self
            .conversations
            .iter()
            .filter(|(_, convo)| convo.is_expired(now))
            .map(|(key, _)| *key)
            .collect();
        expired
            .into_iter()
            .filter_map(|key| {
                self.conversations
                    .remove(&key)
                    .map(|convo| (key, Reply::text(convo.step.timeout_message())))
            })
            .collect()
    }

    fn item_name(&self, raw: &str) -> Result<String, Reply> {
        clean_item_name(raw, self.max_item_name_len).map_err(|e| Reply::text(format!("{}.", e)))
    }

    fn store_failure(context: &str, err: &EconomyError) -> Reply {
        warn!("Item store failure during {}: {}", context, err);
        Reply::text(STORE_FAILURE)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn run_command(
        &mut self,
        invoker: &Invoker,
        command: ItemCommand,
        now: DateTime<Utc>,
    ) -> StepResult {
        match command {
            ItemCommand::Inventory(target) => StepResult::done(self.inventory(invoker, target)),
            ItemCommand::GetItem(raw) => match self.item_name(&raw) {
                Ok(item) => StepResult::done(self.get_item(invoker, &item, now)),
                Err(reply) => StepResult::done(reply),
            },
            ItemCommand::CreateItem(raw) => {
                if !invoker.can_manage_guild {
                    return StepResult::done(Reply::text(NEEDS_MANAGE_GUILD));
                }
                match self.item_name(&raw) {
                    Ok(item) => StepResult::done(self.create_item(invoker, &item)),
                    Err(reply) => StepResult::done(reply),
                }
            }
            ItemCommand::AcquireItem(raw) => {
                if !invoker.can_manage_guild {
                    return StepResult::done(Reply::text(NEEDS_MANAGE_GUILD));
                }
                match self.item_name(&raw) {
                    Ok(item) => self.acquire_item(invoker, &item),
                    Err(reply) => StepResult::done(reply),
                }
            }
            ItemCommand::Craft { item, amount } => match self.item_name(&item) {
                Ok(item) => self.craft(invoker, &item, amount),
                Err(reply) => StepResult::done(reply),
            },
            ItemCommand::CraftTooMany(raw) => match self.item_name(&raw) {
                Ok(item) => StepResult::done(self.craft_too_many(invoker, &item)),
                Err(reply) => StepResult::done(reply),
            },
            ItemCommand::Recipe(raw) => match self.item_name(&raw) {
                Ok(item) => StepResult::done(self.show_recipe(invoker, &item)),
                Err(reply) => StepResult::done(reply),
            },
            ItemCommand::Help => StepResult::done(Reply::text(help_text(&self.prefix))),
            ItemCommand::MissingArgument(name) => StepResult::done(Reply::text(usage(name, &self.prefix))),
            ItemCommand::Unknown(verb) => {
                debug!("Ignoring unknown command '{}'", escape_log(&verb));
                StepResult {
                    replies: Vec::new(),
                    next: None,
                }
            }
        }
    }

    fn inventory(&self, invoker: &Invoker, target: Option<String>) -> Reply {
        let (user_id, display) = match target {
            None => (invoker.user_id, invoker.display_name.clone()),
            Some(raw) => match parse_user_reference(&raw) {
                Some(id) if id == invoker.user_id.0 => (invoker.user_id, invoker.display_name.clone()),
                Some(id) => (UserId(id), format!("User {}", id)),
                None => {
                    return Reply::text(format!(
                        "I couldn't find a user `{}`.",
                        clean_content(&raw)
                    ))
                }
            },
        };

        let items = match self.store.get_inventory(invoker.guild_id, user_id) {
            Ok(items) => items,
            Err(e) => return Self::store_failure("inventory", &e),
        };
        if items.is_empty() {
            return Reply::text(format!("**{}** has no items :c", display));
        }
        let mut content = format!("**{}**'s inventory\n", display);
        content.push_str(&format_inventory_lines(&items).join("\n"));
        Reply::text(content)
    }

    fn get_item(&mut self, invoker: &Invoker, item: &str, now: DateTime<Utc>) -> Reply {
        let record = match self.store.get_command_acquire(invoker.guild_id, item) {
            Ok(Some(record)) => record,
            Ok(None) => {
                return Reply::text(format!(
                    "You can't acquire '{}' items via the `getitem` command.",
                    item
                ))
            }
            Err(e) => return Self::store_failure("getitem", &e),
        };
        let (min, max, cooldown_secs) = match record.method {
            AcquireMethod::Command {
                min_acquired,
                max_acquired,
                cooldown_secs,
            } => (min_acquired, max_acquired, cooldown_secs),
        };

        let key = CooldownKey::new(invoker.guild_id, invoker.user_id, item);
        if let Err(remaining) = self.cooldowns.try_acquire(&key, cooldown_secs, now) {
            return Reply::text(format!(
                "You can't run this command again for another `{}`.",
                TimeValue::from_duration(remaining).clean_spaced()
            ));
        }

        let (min, max) = normalize_range(min, max);
        let amount = get_acquire_amount(&mut self.rng, min, max);
        match self
            .store
            .add_to_inventory(invoker.guild_id, invoker.user_id, item, amount)
        {
            Ok(_) => Reply::text(format!(
                "You've received `{}x {}`.",
                format_amount(amount),
                item
            )),
            Err(e) => Self::store_failure("getitem", &e),
        }
    }

    fn create_item(&self, invoker: &Invoker, item: &str) -> Reply {
        match self.store.create_item(invoker.guild_id, item) {
            Ok(_) => Reply::text(format!(
                "Added an item with name '{}' to your guild. Add acquire methods with the `{}acquireitem {}` command.",
                item, self.prefix, item
            )),
            Err(EconomyError::DuplicateItem(_)) => Reply::text(format!(
                "There's already an item with the name '{}' in your guild.",
                item
            )),
            Err(e) => Self::store_failure("createitem", &e),
        }
    }

    fn acquire_item(&self, invoker: &Invoker, item: &str) -> StepResult {
        match self.store.item_exists(invoker.guild_id, item) {
            Ok(true) => {}
            Ok(false) => {
                return StepResult::done(Reply::text(format!(
                    "There's no item with the name '{}' in your guild. If you want one, you can set one up with `{}createitem {}`.",
                    item, self.prefix, item
                )))
            }
            Err(e) => return StepResult::done(Self::store_failure("acquireitem", &e)),
        }

        info!("Setting up an item acquire for '{}' in {}", item, invoker.guild_id);
        let prompt = format!(
            "You can set up items to be acquired via messages sent (like level up exp, {}), via command (like a daily command {}), and/or via crafting ({}). What would you like to set up now?",
            Reaction::BlueHeart.emoji(),
            Reaction::GreenHeart.emoji(),
            Reaction::YellowHeart.emoji()
        );
        StepResult::ask(
            Reply::with_reactions(
                prompt,
                &[
                    Reaction::BlueHeart,
                    Reaction::GreenHeart,
                    Reaction::YellowHeart,
                    Reaction::Cross,
                ],
            ),
            ConversationStep::AcquireChoice {
                item: item.to_string(),
            },
        )
    }

    fn craft(&self, invoker: &Invoker, item: &str, amount: Option<i64>) -> StepResult {
        let recipe = match self.store.get_recipe(invoker.guild_id, item) {
            Ok(recipe) => recipe,
            Err(EconomyError::NoSuchRecipe(_)) => {
                return StepResult::done(Reply::text(format!(
                    "There's no crafting recipe for '{}'.",
                    item
                )))
            }
            Err(e) => return StepResult::done(Self::store_failure("craft", &e)),
        };

        if let Some(requested) = amount {
            return StepResult::done(self.perform_craft(invoker, item, requested));
        }

        let inventory = match self.store.get_inventory(invoker.guild_id, invoker.user_id) {
            Ok(inventory) => inventory,
            Err(e) => return StepResult::done(Self::store_failure("craft", &e)),
        };
        let max = match max_craftable(&inventory, &recipe) {
            Ok(max) => max,
            Err(e) => return StepResult::done(Self::store_failure("craft", &e)),
        };
        if max == 0 {
            return StepResult::done(Reply::text(format!(
                "You don't have enough ingredients to craft any `{}` (it takes {}).",
                item,
                format_recipe(&recipe)
            )));
        }
        StepResult::ask(
            Reply::text(format!(
                "You can craft `{}` up to {} times ({}). How many times would you like to craft it?",
                item,
                format_amount(max),
                format_recipe(&recipe)
            )),
            ConversationStep::CraftAmount {
                item: item.to_string(),
            },
        )
    }

    fn craft_too_many(&self, invoker: &Invoker, item: &str) -> Reply {
        match self.store.get_recipe(invoker.guild_id, item) {
            Ok(_) => Reply::text(TOO_MANY_TO_CRAFT),
            Err(EconomyError::NoSuchRecipe(_)) => {
                Reply::text(format!("There's no crafting recipe for '{}'.", item))
            }
            Err(e) => Self::store_failure("craft", &e),
        }
    }

    fn perform_craft(&self, invoker: &Invoker, item: &str, requested: i64) -> Reply {
        if requested <= 0 {
            return Reply::text("Alright, not crafting anything.");
        }
        match self
            .store
            .craft(invoker.guild_id, invoker.user_id, item, requested)
        {
            Ok(outcome) => {
                info!(
                    "User {} crafted {}x {} in {}",
                    invoker.user_id, outcome.crafted_amount, item, invoker.guild_id
                );
                Reply::text(format!(
                    "You crafted `{}x {}`.",
                    format_amount(outcome.crafted_amount),
                    item
                ))
            }
            Err(EconomyError::InsufficientIngredients(ingredient)) => Reply::text(format!(
                "You don't have enough `{}` to craft that many `{}`.",
                ingredient, item
            )),
            Err(EconomyError::NoSuchRecipe(_)) => {
                Reply::text(format!("There's no crafting recipe for '{}'.", item))
            }
            Err(EconomyError::InvalidRequestedAmount(_)) => Reply::text(TOO_MANY_TO_CRAFT),
            Err(e) => Self::store_failure("craft", &e),
        }
    }

    fn show_recipe(&self, invoker: &Invoker, item: &str) -> Reply {
        match self.store.get_recipe(invoker.guild_id, item) {
            Ok(recipe) => Reply::text(format!("Recipe: {}.", format_recipe(&recipe))),
            Err(EconomyError::NoSuchRecipe(_)) => {
                Reply::text(format!("There's no crafting recipe for '{}'.", item))
            }
            Err(e) => Self::store_failure("recipe", &e),
        }
    }

    // ------------------------------------------------------------------
    // Conversations
    // ------------------------------------------------------------------

    fn continue_conversation(
        &mut self,
        invoker: &Invoker,
        step: ConversationStep,
        event: &ChatEvent,
    ) -> StepResult {
        match (step, event) {
            (ConversationStep::AcquireChoice { item }, ChatEvent::Reaction(reaction)) => {
                let kind = match reaction {
                    Reaction::BlueHeart => AcquireKind::Message,
                    Reaction::GreenHeart => AcquireKind::Command,
                    Reaction::YellowHeart => AcquireKind::Crafting,
                    _ => {
                        info!(
                            "Aborted setting up item acquire for '{}' in {}",
                            item, invoker.guild_id
                        );
                        return StepResult::done(Reply::text(format!(
                            "Alright, aborting setting up an item acquire method for '{}'.",
                            item
                        )));
                    }
                };
                info!(
                    "Setting up a {} acquire for '{}' in {}",
                    kind.label(),
                    item,
                    invoker.guild_id
                );
                match kind {
                    AcquireKind::Command => self.begin_command_setup(invoker, item),
                    AcquireKind::Message => StepResult::done(Reply::text(
                        "Setting up item acquirement via messages isn't supported yet.",
                    )),
                    AcquireKind::Crafting => StepResult::ask(
                        Reply::text(
                            "What item, and how many of that item, make up an ingredient of this crafting recipe (eg `5 cat`, `1 pizza slice`, `69 bee`, etc)?\n(Items are not checked until the end, so make sure you're spelling things correctly)",
                        ),
                        ConversationStep::RecipeFirstIngredient { item },
                    ),
                }
            }

            (ConversationStep::CommandExisting { item }, ChatEvent::Reaction(Reaction::Cross)) => {
                match self.store.delete_command_acquire(invoker.guild_id, &item) {
                    Ok(_) => StepResult::done(Reply::text(format!(
                        "Deleted the `{}getitem {}` command.",
                        self.prefix, item
                    ))),
                    Err(e) => StepResult::done(Self::store_failure("acquireitem", &e)),
                }
            }
            (ConversationStep::CommandExisting { item }, ChatEvent::Reaction(_)) => {
                self.ask_minimum(item)
            }

            (ConversationStep::CommandMinimum { item }, ChatEvent::Message { content }) => {
                match parse_amount(content) {
                    Ok(minimum) => StepResult::ask(
                        Reply::text("What's the _maximum_ you want users to be able to get?"),
                        ConversationStep::CommandMaximum { item, minimum },
                    ),
                    Err(e) => StepResult::done(Self::invalid_input(&e)),
                }
            }
            (ConversationStep::CommandMaximum { item, minimum }, ChatEvent::Message { content }) => {
                match parse_amount(content) {
                    Ok(maximum) => StepResult::ask(
                        Reply::text("Obviously the command shouldn't be run all the time - how often should users be able to run the command (eg `1h`, `5m`, etc)?"),
                        ConversationStep::CommandCooldown { item, minimum, maximum },
                    ),
                    Err(e) => StepResult::done(Self::invalid_input(&e)),
                }
            }
            (
                ConversationStep::CommandCooldown {
                    item,
                    minimum,
                    maximum,
                },
                ChatEvent::Message { content },
            ) => match TimeValue::parse(content) {
                Ok(cooldown) => self.save_command_acquire(invoker, &item, minimum, maximum, cooldown),
                Err(e) => StepResult::done(Self::invalid_input(&e)),
            },

            (ConversationStep::RecipeFirstIngredient { item }, ChatEvent::Message { content }) => {
                self.collect_ingredient(item, Vec::new(), content)
            }
            (
                ConversationStep::RecipeMoreIngredients { item, ingredients },
                ChatEvent::Message { content },
            ) => self.collect_ingredient(item, ingredients, content),
            (
                ConversationStep::RecipeMoreIngredients { item, ingredients },
                ChatEvent::Reaction(_),
            ) => StepResult::ask(
                Reply::text(format!(
                    "How many `{}` should be created from this crafting recipe?",
                    item
                )),
                ConversationStep::RecipeOutputAmount { item, ingredients },
            ),
            (
                ConversationStep::RecipeOutputAmount { item, ingredients },
                ChatEvent::Message { content },
            ) => match parse_count(content) {
                Ok(amount) if amount > 0 => self.save_recipe(invoker, &item, ingredients, amount as u64),
                Ok(_) => StepResult::done(Reply::text(format!(
                    "A recipe has to create at least one `{}` - please try again later.",
                    item
                ))),
                Err(e) => StepResult::done(Self::invalid_input(&e)),
            },

            (ConversationStep::CraftAmount { item }, ChatEvent::Message { content }) => {
                match parse_count(content) {
                    Ok(requested) => StepResult::done(self.perform_craft(invoker, &item, requested)),
                    Err(e) => StepResult::done(Self::invalid_input(&e)),
                }
            }

            // Filtered out by accepts_messages / accepted_reactions
            (step, _) => StepResult {
                replies: Vec::new(),
                next: Some(step),
            },
        }
    }

    fn invalid_input(err: &ValidationError) -> Reply {
        Reply::text(format!("{} - please try again later.", err))
    }

    fn begin_command_setup(&self, invoker: &Invoker, item: String) -> StepResult {
        match self.store.get_command_acquire(invoker.guild_id, &item) {
            Ok(Some(_)) => StepResult::ask(
                Reply::with_reactions(
                    format!(
                        "You already have an acquire method set up for commands via the `{p}getitem {i}` command. Would you like to remove this command ({x}) or alter how the command works ({q})?",
                        p = self.prefix,
                        i = item,
                        x = Reaction::Cross.emoji(),
                        q = Reaction::QuestionMark.emoji()
                    ),
                    &[Reaction::Cross, Reaction::QuestionMark],
                ),
                ConversationStep::CommandExisting { item },
            ),
            Ok(None) => self.ask_minimum(item),
            Err(e) => StepResult::done(Self::store_failure("acquireitem", &e)),
        }
    }

    fn ask_minimum(&self, item: String) -> StepResult {
        StepResult::ask(
            Reply::text(format!(
                "When the `{}getitem {}` command is run, they'll be given a random amount of the item - what's the _minimum_ you want users to be able to get?",
                self.prefix, item
            )),
            ConversationStep::CommandMinimum { item },
        )
    }

    fn save_command_acquire(
        &self,
        invoker: &Invoker,
        item: &str,
        first: u64,
        second: u64,
        cooldown: TimeValue,
    ) -> StepResult {
        let (min, max) = normalize_range(first, second);
        let method = AcquireMethod::Command {
            min_acquired: min,
            max_acquired: max,
            cooldown_secs: cooldown.seconds,
        };
        if let Err(e) = self.store.put_acquire_method(invoker.guild_id, item, method) {
            return StepResult::done(Self::store_failure("acquireitem", &e));
        }
        info!(
            "Saved command acquire for '{}' in {}: {}-{} every {}s",
            item, invoker.guild_id, min, max, cooldown.seconds
        );
        StepResult::done(Reply::text(format!(
            "Information saved to database - you can now acquire between `{}` and `{}` of '{}' every `{}` via the `{}getitem {}` command.",
            format_amount(min),
            format_amount(max),
            item,
            cooldown.clean_spaced(),
            self.prefix,
            item
        )))
    }

    fn collect_ingredient(
        &self,
        item: String,
        mut ingredients: Vec<(u64, String)>,
        content: &str,
    ) -> StepResult {
        match parse_ingredient_line(content, self.max_item_name_len) {
            Ok(ingredient) => {
                ingredients.push(ingredient);
                StepResult::ask(
                    Reply::with_reactions(
                        format!(
                            "Is there another item that's part of this recipe (eg `5 cat`, `1 pizza slice`, `69 bee`, etc)? If not, just react ({}) below.",
                            Reaction::Cross.emoji()
                        ),
                        &[Reaction::Cross],
                    ),
                    ConversationStep::RecipeMoreIngredients { item, ingredients },
                )
            }
            Err(e) => StepResult::done(Self::invalid_input(&e)),
        }
    }

    fn save_recipe(
        &self,
        invoker: &Invoker,
        item: &str,
        ingredients: Vec<(u64, String)>,
        amount_created: u64,
    ) -> StepResult {
        let mut recipe = CraftingRecipe::new(invoker.guild_id, item, amount_created);
        for (amount, name) in &ingredients {
            recipe.add_ingredient(name, *amount);
        }
        match self.store.put_recipe(recipe) {
            Ok(()) => StepResult::done(Reply::text("Your crafting recipe has been added!")),
            Err(EconomyError::UnknownIngredients(names)) => StepResult::done(Reply::text(format!(
                "You gave some invalid items in your ingredients - {} - please try again later.",
                names.join(", ")
            ))),
            Err(e) if e.is_user_facing() => StepResult::done(Reply::text(format!(
                "That recipe doesn't work: {} - please try again later.",
                e
            ))),
            Err(e) => StepResult::done(Self::store_failure("recipe setup", &e)),
        }
    }
}
