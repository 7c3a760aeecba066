//! # Sous Game
//!
//! Recipe orchestration for the Sous cooking game.
//!
//! ## Features
//! - Phase state machine walking a recipe copy step by step
//! - Mini-game scores accumulated into a total with a star rating
//! - Kitchen glue that runs sessions, relays live values and pays out rewards
//! - Typed events for the presentation layer

pub mod events;
pub mod kitchen;
pub mod orchestrator;
pub mod rating;

pub use events::GameEvent;
pub use kitchen::{Kitchen, RecipeReport};
pub use orchestrator::{
    Advance, CameraPreset, Completion, CookingGame, GamePhase, GameSnapshot, PASS_THROUGH_SCORE,
};
pub use rating::{
    RecipeReward, RewardTable, THREE_STAR_PERCENT, TWO_STAR_PERCENT, compute_rewards,
    score_percentage, star_rating, stars_for_percentage,
};

use thiserror::Error;

/// Orchestration errors. A rejected call leaves the game untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Cannot {action} in phase {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: GamePhase,
    },

    #[error("Recipe '{0}' has no steps")]
    EmptyRecipe(String),

    #[error("No recipe is being cooked")]
    NoRecipe,
}

/// Result type for orchestration
pub type GameResult<T> = Result<T, GameError>;
