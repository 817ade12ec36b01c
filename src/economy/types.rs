use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ITEM_SCHEMA_VERSION: u8 = 1;
pub const INVENTORY_SCHEMA_VERSION: u8 = 1;
pub const RECIPE_SCHEMA_VERSION: u8 = 1;
pub const ACQUIRE_SCHEMA_VERSION: u8 = 1;

/// Chat-server scope; every item, inventory and recipe is partitioned by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuildId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user's holdings, keyed by item name. Ordered so listings are stable.
pub type Inventory = BTreeMap<String, u64>;

/// An item a guild has defined. The name is always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub guild_id: GuildId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_item_schema_version")]
    pub schema_version: u8,
}

fn default_item_schema_version() -> u8 {
    ITEM_SCHEMA_VERSION
}

impl ItemRecord {
    pub fn new(guild_id: GuildId, name: &str) -> Self {
        Self {
            guild_id,
            name: name.to_string(),
            created_at: Utc::now(),
            schema_version: ITEM_SCHEMA_VERSION,
        }
    }
}

/// A single (guild, user, item) holding. Rows may sit at zero and are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub item_name: String,
    pub amount: u64,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl InventoryEntry {
    pub fn new(guild_id: GuildId, user_id: UserId, item_name: &str, amount: u64) -> Self {
        Self {
            guild_id,
            user_id,
            item_name: item_name.to_string(),
            amount,
            updated_at: Utc::now(),
            schema_version: INVENTORY_SCHEMA_VERSION,
        }
    }
}

/// One required input of a crafting recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item_name: String,
    /// Amount consumed per single craft; always positive in a valid recipe
    pub amount: u64,
}

impl Ingredient {
    pub fn new(item_name: &str, amount: u64) -> Self {
        Self {
            item_name: item_name.to_string(),
            amount,
        }
    }
}

/// Guild-scoped crafting definition for a single output item.
///
/// Ingredients keep the order the recipe was declared in; resolution reports
/// the first ingredient (in that order) that an inventory cannot cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingRecipe {
    pub guild_id: GuildId,
    /// Item produced by the recipe
    pub item_name: String,
    /// Units of `item_name` produced per craft
    pub amount_created: u64,
    pub ingredients: Vec<Ingredient>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl CraftingRecipe {
    pub fn new(guild_id: GuildId, item_name: &str, amount_created: u64) -> Self {
        Self {
            guild_id,
            item_name: item_name.to_string(),
            amount_created,
            ingredients: Vec::new(),
            created_at: Utc::now(),
            schema_version: RECIPE_SCHEMA_VERSION,
        }
    }

    /// Append an ingredient. A repeated name folds into the existing entry
    /// so the declared order is kept and each name appears once.
    pub fn with_ingredient(mut self, item_name: &str, amount: u64) -> Self {
        self.add_ingredient(item_name, amount);
        self
    }

    pub fn add_ingredient(&mut self, item_name: &str, amount: u64) {
        if let Some(existing) = self
            .ingredients
            .iter_mut()
            .find(|i| i.item_name == item_name)
        {
            existing.amount = existing.amount.saturating_add(amount);
        } else {
            self.ingredients.push(Ingredient::new(item_name, amount));
        }
    }

    /// Ingredient names in declared order.
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|i| i.item_name.as_str())
    }
}

/// The ways a guild manager can choose to make an item obtainable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcquireKind {
    /// Earned by sending messages. Not supported yet.
    Message,
    /// Granted by the `getitem` command with a random amount and cooldown.
    Command,
    /// Produced from other items via a crafting recipe.
    Crafting,
}

impl AcquireKind {
    pub fn label(self) -> &'static str {
        match self {
            AcquireKind::Message => "message",
            AcquireKind::Command => "command",
            AcquireKind::Crafting => "crafting",
        }
    }
}

/// A stored acquire configuration for one (guild, item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquireMethod {
    Command {
        min_acquired: u64,
        max_acquired: u64,
        cooldown_secs: u64,
    },
}

impl AcquireMethod {
    pub fn kind(&self) -> AcquireKind {
        match self {
            AcquireMethod::Command { .. } => AcquireKind::Command,
        }
    }
}

/// Persisted wrapper carrying the scope and schema version of an acquire method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquireMethodRecord {
    pub guild_id: GuildId,
    pub item_name: String,
    pub method: AcquireMethod,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl AcquireMethodRecord {
    pub fn new(guild_id: GuildId, item_name: &str, method: AcquireMethod) -> Self {
        Self {
            guild_id,
            item_name: item_name.to_string(),
            method,
            updated_at: Utc::now(),
            schema_version: ACQUIRE_SCHEMA_VERSION,
        }
    }
}

/// Result of resolving a craft against an inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftOutcome {
    /// Full inventory after the craft
    pub inventory: Inventory,
    /// Units of the output item produced
    pub crafted_amount: u64,
    /// Absolute new amounts for every entry the craft touched
    pub changes: BTreeMap<String, u64>,
}

impl CraftOutcome {
    pub fn is_noop(&self) -> bool {
        self.crafted_amount == 0 && self.changes.is_empty()
    }
}

/// Record counts reported by the `status` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub items: usize,
    pub inventory_entries: usize,
    pub recipes: usize,
    pub acquire_methods: usize,
}
