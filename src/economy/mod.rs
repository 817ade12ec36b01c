//! Guild item economy: data model, recipe resolution, acquisition rules
//! and the sled-backed store that persists them.

pub mod acquire;
pub mod crafting;
pub mod errors;
pub mod inventory;
pub mod storage;
pub mod types;

pub use acquire::{
    cooldown_remaining, get_acquire_amount, is_on_cooldown, normalize_range, CooldownKey,
    CooldownTracker, InMemoryCooldowns,
};
pub use crafting::{max_craftable, resolve_craft, validate_recipe};
pub use errors::EconomyError;
pub use inventory::{format_amount, format_inventory_lines, format_recipe, get_item_quantity};
pub use storage::{EconomyStore, EconomyStoreBuilder};
pub use types::*;
