use thiserror::Error;

/// Errors that can arise while resolving crafts or touching the economy store.
#[derive(Debug, Error)]
pub enum EconomyError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// An item with this name already exists in the guild.
    #[error("duplicate item: {0}")]
    DuplicateItem(String),

    /// The item has no crafting definition.
    #[error("no crafting recipe for {0}")]
    NoSuchRecipe(String),

    /// First ingredient (in recipe order) the inventory cannot cover.
    #[error("insufficient ingredients: {0}")]
    InsufficientIngredients(String),

    /// Recipe definition is unusable (no ingredients, zero amounts).
    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),

    /// Ingredient names that do not exist as items in the guild.
    #[error("unknown ingredients: {}", .0.join(", "))]
    UnknownIngredients(Vec<String>),

    /// Requested craft count cannot be represented.
    #[error("invalid requested amount: {0}")]
    InvalidRequestedAmount(i64),
}

impl EconomyError {
    /// True for errors caused by the request itself rather than storage.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            EconomyError::DuplicateItem(_)
                | EconomyError::NoSuchRecipe(_)
                | EconomyError::InsufficientIngredients(_)
                | EconomyError::InvalidRecipe(_)
                | EconomyError::UnknownIngredients(_)
                | EconomyError::InvalidRequestedAmount(_)
        )
    }
}
