/// Inventory lookups and display helpers
use super::types::{CraftingRecipe, Inventory};

/// Amount held of an item; absent entries count as zero.
pub fn get_item_quantity(inventory: &Inventory, item_name: &str) -> u64 {
    inventory.get(item_name).copied().unwrap_or(0)
}


/// Group digits in threes: `1234567` becomes `1,234,567`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One `Nx item` line per entry, including entries that have dropped to zero.
pub fn format_inventory_lines(inventory: &Inventory) -> Vec<String> {
    inventory
        .iter()
        .map(|(name, amount)| format!("{}x {}", format_amount(*amount), name))
        .collect()
}

/// Human summary of a recipe: `3x widget from 2x cat, 1x bee`.
pub fn format_recipe(recipe: &CraftingRecipe) -> String {
    let parts: Vec<String> = recipe
        .ingredients
        .iter()
        .map(|i| format!("{}x {}", format_amount(i.amount), i.item_name))
        .collect();
    format!(
        "{}x {} from {}",
        format_amount(recipe.amount_created),
        recipe.item_name,
        parts.join(", ")
    )
}
