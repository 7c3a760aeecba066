//! # Sous Recipes
//!
//! Recipe catalog for the Sous cooking game.
//!
//! ## Features
//! - One canonical recipe shape with derived totals and a simplified listing projection
//! - Validation of ids, steps, ingredients and mini-game bindings at load time
//! - Filtering by category, cuisine, difficulty, health tag, time and free text
//! - Built-in recipe set embedded in the binary

pub mod catalog;
pub mod recipe;
pub mod types;

pub use catalog::{Catalog, RecipeQuery, SortKey};
pub use recipe::{Ingredient, Recipe, RecipeStep, RecipeSummary, Rewards, StepId, UnlockRequirements};
pub use types::{
    Allergens, CameraAngle, CookingAction, Cuisine, Difficulty, DifficultyTier, HealthTags,
    IngredientCategory, Nutrition, RecipeCategory,
};

use sous_minigames::MiniGameError;
use thiserror::Error;

/// Recipe validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecipeError {
    #[error("Recipe id is empty")]
    MissingId,

    #[error("Invalid recipe '{recipe}': {reason}")]
    Invalid { recipe: String, reason: String },

    #[error("Recipe '{recipe}' step {step}: {source}")]
    MiniGame {
        recipe: String,
        step: StepId,
        #[source]
        source: MiniGameError,
    },

    #[error("Difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),

    #[error("Unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },
}

/// Result type for recipe operations
pub type RecipeResult<T> = Result<T, RecipeError>;

/// Catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse recipes: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] RecipeError),

    #[error("Duplicate recipe id '{0}'")]
    DuplicateRecipe(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
