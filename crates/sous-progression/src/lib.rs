//! # Sous Progression
//!
//! Player progression and persistence for the Sous cooking game.
//!
//! ## Features
//! - XP curve, level milestones, chef titles and daily streak multiplier
//! - Coins, recipe purchases and per-recipe best results
//! - Achievements derived from the profile and lifetime statistics
//! - Versioned JSON saves with migrations and backup recovery

pub mod achievements;
pub mod profile;
pub mod save;

pub use achievements::{Achievement, default_achievements};
pub use profile::{ChefTitle, MAX_LEVEL, Milestone, Progression, RecipeStats, xp_for_level};
pub use save::{GameSettings, GraphicsQuality, PlayerInfo, SaveData, SaveStore, Statistics};

use thiserror::Error;

/// Progression errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("Not enough coins: need {needed}, have {available}")]
    InsufficientCoins { needed: u64, available: u64 },

    #[error("Requires level {required}, currently level {level}")]
    LevelTooLow { required: u32, level: u32 },

    #[error("Complete '{0}' first")]
    MissingPrerequisite(String),

    #[error("Recipe '{0}' is already unlocked")]
    AlreadyUnlocked(String),

    #[error("Corrupt progression: {0}")]
    Corrupt(String),
}

/// Result type for progression operations
pub type ProgressionResult<T> = Result<T, ProgressionError>;

/// Save storage errors
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Save has no version field")]
    MissingVersion,

    #[error("Save version {found} is newer than supported version {current}")]
    UnsupportedVersion { found: u32, current: u32 },

    #[error("No migration from save version {0}")]
    NoMigration(u32),

    #[error("Invalid save data: {0}")]
    Invalid(String),
}

/// Result type for save operations
pub type SaveResult<T> = Result<T, SaveError>;
