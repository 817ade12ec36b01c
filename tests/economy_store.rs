//! Store-level behaviour that spans several calls: concurrent crafts,
//! guild isolation and persistence across reopen.
mod common;

use common::{temp_store, GUILD};
use guildcraft::economy::{CraftingRecipe, EconomyError, EconomyStoreBuilder, GuildId, UserId};

#[test]
fn concurrent_crafts_never_overspend() {
    let (_dir, store) = temp_store();
    store.create_item(GUILD, "ore").unwrap();
    store.create_item(GUILD, "ingot").unwrap();
    store
        .put_recipe(CraftingRecipe::new(GUILD, "ingot", 1).with_ingredient("ore", 3))
        .unwrap();
    store.add_to_inventory(GUILD, UserId(1), "ore", 30).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                let mut crafted = 0u64;
                for _ in 0..5 {
                    match store.craft(GUILD, UserId(1), "ingot", 1) {
                        Ok(outcome) => crafted += outcome.crafted_amount,
                        Err(EconomyError::InsufficientIngredients(name)) => assert_eq!(name, "ore"),
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                crafted
            })
        })
        .collect();
    let crafted: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let held = store.get_inventory(GUILD, UserId(1)).unwrap();
    assert_eq!(crafted, 10);
    assert_eq!(held.get("ingot"), Some(&10));
    assert_eq!(held.get("ore"), Some(&0));
}

#[test]
fn guilds_do_not_share_anything() {
    let (_dir, store) = temp_store();
    let other = GuildId(GUILD.0 + 1);
    store.create_item(GUILD, "cat").unwrap();
    store.create_item(other, "cat").unwrap();
    store.add_to_inventory(GUILD, UserId(1), "cat", 5).unwrap();

    assert!(store.get_inventory(other, UserId(1)).unwrap().is_empty());
    store
        .put_recipe(CraftingRecipe::new(GUILD, "cat", 1).with_ingredient("cat", 1))
        .unwrap();
    assert!(matches!(
        store.get_recipe(other, "cat"),
        Err(EconomyError::NoSuchRecipe(_))
    ));
}

#[test]
fn crafting_outcome_reports_full_inventory() {
    let (_dir, store) = temp_store();
    for item in ["cat", "bee", "widget", "hat"] {
        store.create_item(GUILD, item).unwrap();
    }
    store
        .put_recipe(
            CraftingRecipe::new(GUILD, "widget", 3)
                .with_ingredient("cat", 2)
                .with_ingredient("bee", 1),
        )
        .unwrap();
    store.add_to_inventory(GUILD, UserId(2), "cat", 4).unwrap();
    store.add_to_inventory(GUILD, UserId(2), "bee", 2).unwrap();
    store.add_to_inventory(GUILD, UserId(2), "hat", 1).unwrap();

    let outcome = store.craft(GUILD, UserId(2), "widget", 2).unwrap();
    assert_eq!(outcome.crafted_amount, 6);
    assert_eq!(outcome.inventory.get("cat"), Some(&0));
    assert_eq!(outcome.inventory.get("bee"), Some(&0));
    assert_eq!(outcome.inventory.get("widget"), Some(&6));
    assert_eq!(outcome.inventory.get("hat"), Some(&1));
    assert!(!outcome.changes.contains_key("hat"));
}

#[test]
fn everything_survives_reopen() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("economy");
    {
        let store = EconomyStoreBuilder::new(&path).open().expect("open");
        store.create_item(GUILD, "cat").unwrap();
        store.add_to_inventory(GUILD, UserId(3), "cat", 7).unwrap();
        store
            .put_recipe(CraftingRecipe::new(GUILD, "cat", 2).with_ingredient("cat", 1))
            .unwrap();
    }
    let store = EconomyStoreBuilder::new(&path).open().expect("reopen");
    assert!(store.item_exists(GUILD, "cat").unwrap());
    assert_eq!(store.get_inventory(GUILD, UserId(3)).unwrap().get("cat"), Some(&7));
    assert_eq!(store.get_recipe(GUILD, "cat").unwrap().amount_created, 2);
    let stats = store.stats();
    assert_eq!(stats.items, 1);
    assert_eq!(stats.recipes, 1);
}
