use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, info};
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionError};
use sled::IVec;

use crate::economy::crafting::{resolve_craft, validate_recipe};
use crate::economy::errors::EconomyError;
use crate::economy::types::{
    AcquireMethod, AcquireMethodRecord, CraftOutcome, CraftingRecipe, GuildId, Inventory,
    InventoryEntry, ItemRecord, StoreStats, UserId, ACQUIRE_SCHEMA_VERSION,
    INVENTORY_SCHEMA_VERSION, ITEM_SCHEMA_VERSION, RECIPE_SCHEMA_VERSION,
};

const TREE_ITEMS: &str = "guild_items";
const TREE_INVENTORIES: &str = "user_inventories";
const TREE_RECIPES: &str = "craftable_items";
const TREE_ACQUIRE: &str = "guild_item_acquire_methods";

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct EconomyStoreBuilder {
    path: PathBuf,
    flush_writes: bool,
}

impl EconomyStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flush_writes: true,
        }
    }

    /// Skip the fsync after each write (throwaway stores in tests).
    pub fn without_flush(mut self) -> Self {
        self.flush_writes = false;
        self
    }

    pub fn open(self) -> Result<EconomyStore, EconomyError> {
        EconomyStore::open_with_options(self.path, self.flush_writes)
    }
}

/// Sled-backed persistence for guild items, user inventories, crafting
/// recipes and acquire methods.
#[derive(Clone)]
pub struct EconomyStore {
    _db: sled::Db,
    items: sled::Tree,
    inventories: sled::Tree,
    recipes: sled::Tree,
    acquire: sled::Tree,
    flush_writes: bool,
}

fn abort<T>(err: EconomyError) -> ConflictableTransactionResult<T, EconomyError> {
    Err(ConflictableTransactionError::Abort(err))
}

fn from_transaction(err: TransactionError<EconomyError>) -> EconomyError {
    match err {
        TransactionError::Abort(inner) => inner,
        TransactionError::Storage(inner) => EconomyError::Sled(inner),
    }
}

impl EconomyStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EconomyError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, flush_writes: bool) -> Result<Self, EconomyError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let items = db.open_tree(TREE_ITEMS)?;
        let inventories = db.open_tree(TREE_INVENTORIES)?;
        let recipes = db.open_tree(TREE_RECIPES)?;
        let acquire = db.open_tree(TREE_ACQUIRE)?;
        debug!("Opened economy store at {}", path_ref.display());
        Ok(Self {
            _db: db,
            items,
            inventories,
            recipes,
            acquire,
            flush_writes,
        })
    }

    fn item_prefix(guild: GuildId) -> String {
        format!("items:{}:", guild.0)
    }

    fn item_key(guild: GuildId, item_name: &str) -> Vec<u8> {
        format!("items:{}:{}", guild.0, item_name).into_bytes()
    }

    fn inventory_prefix(guild: GuildId, user: UserId) -> String {
        format!("inv:{}:{}:", guild.0, user.0)
    }

    fn inventory_key(guild: GuildId, user: UserId, item_name: &str) -> Vec<u8> {
        format!("inv:{}:{}:{}", guild.0, user.0, item_name).into_bytes()
    }

    fn recipe_prefix(guild: GuildId) -> String {
        format!("recipes:{}:", guild.0)
    }

    fn recipe_key(guild: GuildId, item_name: &str) -> Vec<u8> {
        format!("recipes:{}:{}", guild.0, item_name).into_bytes()
    }

    fn command_acquire_key(guild: GuildId, item_name: &str) -> Vec<u8> {
        format!("acquire:{}:{}:command", guild.0, item_name).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, EconomyError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, EconomyError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn decode_entry(bytes: IVec) -> Result<InventoryEntry, EconomyError> {
        let entry: InventoryEntry = Self::deserialize(bytes)?;
        if entry.schema_version != INVENTORY_SCHEMA_VERSION {
            return Err(EconomyError::SchemaMismatch {
                entity: "inventory",
                expected: INVENTORY_SCHEMA_VERSION,
                found: entry.schema_version,
            });
        }
        Ok(entry)
    }

    fn flush(&self, tree: &sled::Tree) -> Result<(), EconomyError> {
        if self.flush_writes {
            tree.flush()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Define a new item. Fails with `DuplicateItem` if the guild already has it.
    pub fn create_item(&self, guild: GuildId, item_name: &str) -> Result<ItemRecord, EconomyError> {
        let record = ItemRecord::new(guild, item_name);
        let bytes = Self::serialize(&record)?;
        let key = Self::item_key(guild, item_name);
        if self
            .items
            .compare_and_swap(key, None::<&[u8]>, Some(bytes))?
            .is_err()
        {
            return Err(EconomyError::DuplicateItem(item_name.to_string()));
        }
        self.flush(&self.items)?;
        info!("Created item '{}' in guild {}", item_name, guild);
        Ok(record)
    }

    pub fn get_item(&self, guild: GuildId, item_name: &str) -> Result<ItemRecord, EconomyError> {
        let Some(bytes) = self.items.get(Self::item_key(guild, item_name))? else {
            return Err(EconomyError::NotFound(format!("item: {}", item_name)));
        };
        let record: ItemRecord = Self::deserialize(bytes)?;
        if record.schema_version != ITEM_SCHEMA_VERSION {
            return Err(EconomyError::SchemaMismatch {
                entity: "item",
                expected: ITEM_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    pub fn item_exists(&self, guild: GuildId, item_name: &str) -> Result<bool, EconomyError> {
        Ok(self.items.contains_key(Self::item_key(guild, item_name))?)
    }

    /// Names of every item the guild has defined.
    pub fn list_items(&self, guild: GuildId) -> Result<BTreeSet<String>, EconomyError> {
        let prefix = Self::item_prefix(guild);
        let mut names = BTreeSet::new();
        for entry in self.items.scan_prefix(prefix.as_bytes()) {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(name) = text.strip_prefix(prefix.as_str()) {
                names.insert(name.to_string());
            }
        }
        Ok(names)
    }

    // ------------------------------------------------------------------
    // Inventories
    // ------------------------------------------------------------------

    /// Every holding of one user in one guild, zero rows included.
    pub fn get_inventory(&self, guild: GuildId, user: UserId) -> Result<Inventory, EconomyError> {
        let prefix = Self::inventory_prefix(guild, user);
        let mut inventory = Inventory::new();
        for entry in self.inventories.scan_prefix(prefix.as_bytes()) {
            let (_, value) = entry?;
            let record = Self::decode_entry(value)?;
            inventory.insert(record.item_name, record.amount);
        }
        Ok(inventory)
    }

    /// Add `amount` to a holding, creating it if needed. Returns the new total.
    pub fn add_to_inventory(
        &self,
        guild: GuildId,
        user: UserId,
        item_name: &str,
        amount: u64,
    ) -> Result<u64, EconomyError> {
        let key = Self::inventory_key(guild, user, item_name);
        let total = self
            .inventories
            .transaction(|tx| -> ConflictableTransactionResult<u64, EconomyError> {
                let current = match tx.get(&key)? {
                    Some(bytes) => match Self::decode_entry(bytes) {
                        Ok(entry) => entry.amount,
                        Err(e) => return abort(e),
                    },
                    None => 0,
                };
                let total = current.saturating_add(amount);
                let entry = InventoryEntry::new(guild, user, item_name, total);
                let bytes = match Self::serialize(&entry) {
                    Ok(bytes) => bytes,
                    Err(e) => return abort(e),
                };
                tx.insert(key.as_slice(), bytes)?;
                Ok(total)
            })
            .map_err(from_transaction)?;
        self.flush(&self.inventories)?;
        Ok(total)
    }

    /// Overwrite several holdings with absolute amounts in one transaction.
    pub fn apply_inventory_diff(
        &self,
        guild: GuildId,
        user: UserId,
        changes: &BTreeMap<String, u64>,
    ) -> Result<(), EconomyError> {
        let mut encoded = Vec::with_capacity(changes.len());
        for (name, amount) in changes {
            let entry = InventoryEntry::new(guild, user, name, *amount);
            encoded.push((Self::inventory_key(guild, user, name), Self::serialize(&entry)?));
        }
        self.inventories
            .transaction(|tx| -> ConflictableTransactionResult<(), EconomyError> {
                for (key, bytes) in &encoded {
                    tx.insert(key.as_slice(), bytes.as_slice())?;
                }
                Ok(())
            })
            .map_err(from_transaction)?;
        self.flush(&self.inventories)
    }

    /// Craft `requested` units of `item_name`'s recipe for a user.
    ///
    /// The touched holdings are read, resolved and written back inside a
    /// single transaction, so a failed or concurrent craft never leaves a
    /// half-applied diff. The returned outcome carries the user's full
    /// inventory as committed.
    pub fn craft(
        &self,
        guild: GuildId,
        user: UserId,
        item_name: &str,
        requested: i64,
    ) -> Result<CraftOutcome, EconomyError> {
        let recipe = self.get_recipe(guild, item_name)?;
        let mut touched: Vec<&str> = recipe.ingredient_names().collect();
        if !touched.contains(&recipe.item_name.as_str()) {
            touched.push(recipe.item_name.as_str());
        }

        let mut outcome = self
            .inventories
            .transaction(|tx| -> ConflictableTransactionResult<CraftOutcome, EconomyError> {
                let mut snapshot = Inventory::new();
                for name in &touched {
                    if let Some(bytes) = tx.get(Self::inventory_key(guild, user, name))? {
                        match Self::decode_entry(bytes) {
                            Ok(entry) => {
                                snapshot.insert(entry.item_name, entry.amount);
                            }
                            Err(e) => return abort(e),
                        }
                    }
                }

                let outcome = match resolve_craft(&snapshot, &recipe, requested) {
                    Ok(outcome) => outcome,
                    Err(e) => return abort(e),
                };

                for (name, amount) in &outcome.changes {
                    let entry = InventoryEntry::new(guild, user, name, *amount);
                    let bytes = match Self::serialize(&entry) {
                        Ok(bytes) => bytes,
                        Err(e) => return abort(e),
                    };
                    tx.insert(Self::inventory_key(guild, user, name), bytes)?;
                }
                Ok(outcome)
            })
            .map_err(from_transaction)?;

        if !outcome.is_noop() {
            self.flush(&self.inventories)?;
            debug!(
                "Crafted {}x {} for user {} in guild {}",
                outcome.crafted_amount, item_name, user, guild
            );
        }
        outcome.inventory = self.get_inventory(guild, user)?;
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Recipes
    // ------------------------------------------------------------------

    /// Save a recipe, replacing any existing one for the same item.
    ///
    /// Ingredient names are checked against the guild's items here and only
    /// here; deleting an item later does not invalidate stored recipes.
    pub fn put_recipe(&self, mut recipe: CraftingRecipe) -> Result<(), EconomyError> {
        validate_recipe(&recipe)?;
        let known = self.list_items(recipe.guild_id)?;
        let unknown: Vec<String> = recipe
            .ingredient_names()
            .filter(|name| !known.contains(*name))
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(EconomyError::UnknownIngredients(unknown));
        }

        recipe.schema_version = RECIPE_SCHEMA_VERSION;
        let key = Self::recipe_key(recipe.guild_id, &recipe.item_name);
        let bytes = Self::serialize(&recipe)?;
        self.recipes.insert(key, bytes)?;
        self.flush(&self.recipes)?;
        info!(
            "Saved crafting recipe for '{}' in guild {} ({} ingredients)",
            recipe.item_name,
            recipe.guild_id,
            recipe.ingredients.len()
        );
        Ok(())
    }

    /// Fetch the recipe for an item, or `NoSuchRecipe`.
    pub fn get_recipe(&self, guild: GuildId, item_name: &str) -> Result<CraftingRecipe, EconomyError> {
        let Some(bytes) = self.recipes.get(Self::recipe_key(guild, item_name))? else {
            return Err(EconomyError::NoSuchRecipe(item_name.to_string()));
        };
        let recipe: CraftingRecipe = Self::deserialize(bytes)?;
        if recipe.schema_version != RECIPE_SCHEMA_VERSION {
            return Err(EconomyError::SchemaMismatch {
                entity: "recipe",
                expected: RECIPE_SCHEMA_VERSION,
                found: recipe.schema_version,
            });
        }
        Ok(recipe)
    }

    /// Remove a recipe. Returns whether one existed.
    pub fn delete_recipe(&self, guild: GuildId, item_name: &str) -> Result<bool, EconomyError> {
        let removed = self.recipes.remove(Self::recipe_key(guild, item_name))?;
        self.flush(&self.recipes)?;
        Ok(removed.is_some())
    }

    pub fn list_recipes(&self, guild: GuildId) -> Result<Vec<CraftingRecipe>, EconomyError> {
        let prefix = Self::recipe_prefix(guild);
        self.recipes
            .scan_prefix(prefix.as_bytes())
            .map(|result| {
                result
                    .map_err(EconomyError::from)
                    .and_then(|(_key, value)| Self::deserialize(value))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Acquire methods
    // ------------------------------------------------------------------

    /// Insert or update an acquire method for an item.
    pub fn put_acquire_method(
        &self,
        guild: GuildId,
        item_name: &str,
        method: AcquireMethod,
    ) -> Result<(), EconomyError> {
        let key = match &method {
            AcquireMethod::Command { .. } => Self::command_acquire_key(guild, item_name),
        };
        let record = AcquireMethodRecord::new(guild, item_name, method);
        self.acquire.insert(key, Self::serialize(&record)?)?;
        self.flush(&self.acquire)
    }

    /// The `getitem` configuration for an item, if one is set up.
    pub fn get_command_acquire(
        &self,
        guild: GuildId,
        item_name: &str,
    ) -> Result<Option<AcquireMethodRecord>, EconomyError> {
        let Some(bytes) = self.acquire.get(Self::command_acquire_key(guild, item_name))? else {
            return Ok(None);
        };
        let record: AcquireMethodRecord = Self::deserialize(bytes)?;
        if record.schema_version != ACQUIRE_SCHEMA_VERSION {
            return Err(EconomyError::SchemaMismatch {
                entity: "acquire method",
                expected: ACQUIRE_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(Some(record))
    }

    /// Remove the `getitem` configuration for an item. Returns whether one existed.
    pub fn delete_command_acquire(&self, guild: GuildId, item_name: &str) -> Result<bool, EconomyError> {
        let removed = self
            .acquire
            .remove(Self::command_acquire_key(guild, item_name))?;
        self.flush(&self.acquire)?;
        Ok(removed.is_some())
    }

    /// Record counts across every guild.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            items: self.items.len(),
            inventory_entries: self.inventories.len(),
            recipes: self.recipes.len(),
            acquire_methods: self.acquire.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::types::Ingredient;
    use tempfile::TempDir;

    const GUILD: GuildId = GuildId(100);
    const ALICE: UserId = UserId(1);

    fn store(dir: &TempDir) -> EconomyStore {
        EconomyStoreBuilder::new(dir.path())
            .without_flush()
            .open()
            .expect("store")
    }

    #[test]
    fn duplicate_items_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.create_item(GUILD, "cat").expect("create");
        assert!(matches!(
            store.create_item(GUILD, "cat"),
            Err(EconomyError::DuplicateItem(name)) if name == "cat"
        ));
        // Same name in another guild is fine
        store.create_item(GuildId(200), "cat").expect("other guild");
        assert_eq!(store.get_item(GUILD, "cat").expect("get").name, "cat");
    }

    #[test]
    fn list_items_is_guild_scoped() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.create_item(GuildId(1), "cat").unwrap();
        store.create_item(GuildId(12), "bee").unwrap();
        let items = store.list_items(GuildId(1)).unwrap();
        assert_eq!(items.into_iter().collect::<Vec<_>>(), vec!["cat".to_string()]);
    }

    #[test]
    fn add_to_inventory_accumulates() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        assert_eq!(store.add_to_inventory(GUILD, ALICE, "cat", 3).unwrap(), 3);
        assert_eq!(store.add_to_inventory(GUILD, ALICE, "cat", 4).unwrap(), 7);
        let inv = store.get_inventory(GUILD, ALICE).unwrap();
        assert_eq!(inv.get("cat"), Some(&7));
        assert!(store.get_inventory(GUILD, UserId(2)).unwrap().is_empty());
    }

    #[test]
    fn apply_diff_writes_absolute_amounts() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.add_to_inventory(GUILD, ALICE, "cat", 10).unwrap();
        let mut changes = BTreeMap::new();
        changes.insert("cat".to_string(), 0);
        changes.insert("widget".to_string(), 2);
        store.apply_inventory_diff(GUILD, ALICE, &changes).unwrap();
        let inv = store.get_inventory(GUILD, ALICE).unwrap();
        assert_eq!(inv, changes);
    }

    #[test]
    fn recipes_are_validated_when_saved() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.create_item(GUILD, "cat").unwrap();
        let recipe = CraftingRecipe::new(GUILD, "widget", 1)
            .with_ingredient("cat", 2)
            .with_ingredient("dog", 1)
            .with_ingredient("bee", 1);
        match store.put_recipe(recipe) {
            Err(EconomyError::UnknownIngredients(names)) => {
                assert_eq!(names, vec!["dog".to_string(), "bee".to_string()])
            }
            other => panic!("expected unknown ingredients, got {:?}", other),
        }
        assert!(matches!(
            store.get_recipe(GUILD, "widget"),
            Err(EconomyError::NoSuchRecipe(_))
        ));
    }

    #[test]
    fn recipes_repeating_an_ingredient_are_not_saved() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.create_item(GUILD, "cat").unwrap();
        store.create_item(GUILD, "widget").unwrap();
        store.add_to_inventory(GUILD, UserId(1), "cat", 5).unwrap();

        let mut recipe = CraftingRecipe::new(GUILD, "widget", 1).with_ingredient("cat", 2);
        recipe.ingredients.push(Ingredient::new("cat", 3));
        assert!(matches!(
            store.put_recipe(recipe),
            Err(EconomyError::InvalidRecipe(_))
        ));
        assert!(matches!(
            store.craft(GUILD, UserId(1), "widget", 1),
            Err(EconomyError::NoSuchRecipe(_))
        ));
        assert_eq!(store.get_inventory(GUILD, UserId(1)).unwrap().get("cat"), Some(&5));
    }

    #[test]
    fn craft_commits_the_whole_diff() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        for name in ["cat", "bee", "widget"] {
            store.create_item(GUILD, name).unwrap();
        }
        store
            .put_recipe(
                CraftingRecipe::new(GUILD, "widget", 3)
                    .with_ingredient("cat", 2)
                    .with_ingredient("bee", 1),
            )
            .unwrap();
        store.add_to_inventory(GUILD, ALICE, "cat", 5).unwrap();
        store.add_to_inventory(GUILD, ALICE, "bee", 2).unwrap();
        store.add_to_inventory(GUILD, ALICE, "hat", 1).unwrap();

        let outcome = store.craft(GUILD, ALICE, "widget", 2).unwrap();
        assert_eq!(outcome.crafted_amount, 6);
        let inv = store.get_inventory(GUILD, ALICE).unwrap();
        assert_eq!(inv.get("cat"), Some(&1));
        assert_eq!(inv.get("bee"), Some(&0));
        assert_eq!(inv.get("widget"), Some(&6));
        assert_eq!(inv.get("hat"), Some(&1));
        assert_eq!(outcome.inventory, inv);
    }

    #[test]
    fn failed_craft_leaves_inventory_untouched() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        for name in ["cat", "bee"] {
            store.create_item(GUILD, name).unwrap();
        }
        store
            .put_recipe(
                CraftingRecipe::new(GUILD, "widget", 3)
                    .with_ingredient("bee", 1)
                    .with_ingredient("cat", 2),
            )
            .unwrap();
        store.add_to_inventory(GUILD, ALICE, "cat", 5).unwrap();
        store.add_to_inventory(GUILD, ALICE, "bee", 9).unwrap();
        let before = store.get_inventory(GUILD, ALICE).unwrap();

        match store.craft(GUILD, ALICE, "widget", 3) {
            Err(EconomyError::InsufficientIngredients(name)) => assert_eq!(name, "cat"),
            other => panic!("expected insufficient cat, got {:?}", other),
        }
        assert_eq!(store.get_inventory(GUILD, ALICE).unwrap(), before);
    }

    #[test]
    fn command_acquire_round_trip_and_delete() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        assert!(store.get_command_acquire(GUILD, "cat").unwrap().is_none());
        let method = AcquireMethod::Command {
            min_acquired: 1,
            max_acquired: 4,
            cooldown_secs: 3600,
        };
        store.put_acquire_method(GUILD, "cat", method.clone()).unwrap();
        let record = store.get_command_acquire(GUILD, "cat").unwrap().expect("present");
        assert_eq!(record.method, method);
        assert!(store.delete_command_acquire(GUILD, "cat").unwrap());
        assert!(!store.delete_command_acquire(GUILD, "cat").unwrap());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().expect("tempdir");
        {
            let store = EconomyStoreBuilder::new(dir.path()).open().expect("store");
            store.create_item(GUILD, "cat").unwrap();
            store.add_to_inventory(GUILD, ALICE, "cat", 2).unwrap();
        }
        let store = EconomyStore::open(dir.path()).expect("reopen");
        assert!(store.item_exists(GUILD, "cat").unwrap());
        assert_eq!(store.get_inventory(GUILD, ALICE).unwrap().get("cat"), Some(&2));
        let stats = store.stats();
        assert_eq!(stats.items, 1);
        assert_eq!(stats.inventory_entries, 1);
    }
}
