//! Recipe resolution: how many times a recipe fits into an inventory, and
//! what the inventory looks like after crafting it `n` times.
//!
//! Everything here is pure. Persisting an outcome is the caller's job and
//! must happen as one atomic write (see `EconomyStore::craft`).

use std::collections::{BTreeMap, BTreeSet};

use super::errors::EconomyError;
use super::inventory::get_item_quantity;
use super::types::{CraftOutcome, CraftingRecipe, Inventory};

/// Reject recipes that cannot be resolved at all.
pub fn validate_recipe(recipe: &CraftingRecipe) -> Result<(), EconomyError> {
    if recipe.ingredients.is_empty() {
        return Err(EconomyError::InvalidRecipe(format!(
            "{} has no ingredients",
            recipe.item_name
        )));
    }
    if let Some(zero) = recipe.ingredients.iter().find(|i| i.amount == 0) {
        return Err(EconomyError::InvalidRecipe(format!(
            "{} requires zero {}",
            recipe.item_name, zero.item_name
        )));
    }
    // Each name is checked against the stock once, so it may appear only once.
    let mut seen = BTreeSet::new();
    if let Some(repeated) = recipe
        .ingredients
        .iter()
        .find(|i| !seen.insert(i.item_name.as_str()))
    {
        return Err(EconomyError::InvalidRecipe(format!(
            "{} lists {} more than once",
            recipe.item_name, repeated.item_name
        )));
    }
    if recipe.amount_created == 0 {
        return Err(EconomyError::InvalidRecipe(format!(
            "{} produces nothing",
            recipe.item_name
        )));
    }
    Ok(())
}

/// Maximum number of crafts the inventory can pay for.
///
/// Returns `Ok(0)` when even a single craft is out of reach; that is not an
/// error, unlike a recipe with no ingredients.
pub fn max_craftable(inventory: &Inventory, recipe: &CraftingRecipe) -> Result<u64, EconomyError> {
    validate_recipe(recipe)?;
    let max = recipe
        .ingredients
        .iter()
        .map(|ingredient| get_item_quantity(inventory, &ingredient.item_name) / ingredient.amount)
        .min()
        .unwrap_or(0);
    Ok(max)
}

/// Apply `requested` crafts of `recipe` to a copy of `inventory`.
///
/// A non-positive request is an abort: the inventory comes back unchanged
/// with nothing crafted. Otherwise every ingredient is checked before
/// anything is touched, and the first one (in declared order) that falls
/// short is reported.
pub fn resolve_craft(
    inventory: &Inventory,
    recipe: &CraftingRecipe,
    requested: i64,
) -> Result<CraftOutcome, EconomyError> {
    validate_recipe(recipe)?;

    if requested <= 0 {
        return Ok(CraftOutcome {
            inventory: inventory.clone(),
            crafted_amount: 0,
            changes: BTreeMap::new(),
        });
    }
    let crafts = requested as u64;

    let mut consumed = Vec::with_capacity(recipe.ingredients.len());
    for ingredient in &recipe.ingredients {
        let have = get_item_quantity(inventory, &ingredient.item_name);
        match ingredient.amount.checked_mul(crafts) {
            Some(required) if required <= have => {
                consumed.push((ingredient.item_name.as_str(), have - required));
            }
            _ => {
                return Err(EconomyError::InsufficientIngredients(
                    ingredient.item_name.clone(),
                ))
            }
        }
    }

    let crafted_amount = recipe
        .amount_created
        .checked_mul(crafts)
        .ok_or(EconomyError::InvalidRequestedAmount(requested))?;

    let mut next = inventory.clone();
    let mut changes = BTreeMap::new();
    for (name, remaining) in consumed {
        next.insert(name.to_string(), remaining);
        changes.insert(name.to_string(), remaining);
    }

    // Output may itself be an ingredient; credit after the debits.
    let output = get_item_quantity(&next, &recipe.item_name)
        .checked_add(crafted_amount)
        .ok_or(EconomyError::InvalidRequestedAmount(requested))?;
    next.insert(recipe.item_name.clone(), output);
    changes.insert(recipe.item_name.clone(), output);

    Ok(CraftOutcome {
        inventory: next,
        crafted_amount,
        changes,
    })
}
