//! Progression contract
//!
//! The game core reports finished recipes through this trait. Implementations
//! keep their own bookkeeping; return values are informational only.

use serde::{Deserialize, Serialize};

/// Where an XP award came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    Recipe(String),
    Achievement(String),
    DailyBonus,
    Other(String),
}

impl std::fmt::Display for XpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recipe(id) => write!(f, "recipe:{id}"),
            Self::Achievement(id) => write!(f, "achievement:{id}"),
            Self::DailyBonus => write!(f, "daily_bonus"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Result of an XP award
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelChange {
    /// XP actually credited after multipliers
    pub xp_awarded: u64,
    pub old_level: u32,
    pub new_level: u32,
    /// Recipes unlocked by milestones reached during this award
    pub unlocked_recipes: Vec<String>,
    /// Coins granted by milestones reached during this award
    pub milestone_coins: u64,
}

impl LevelChange {
    /// True when at least one level was gained
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// Receiver of recipe-completion rewards
pub trait ProgressionSink {
    /// Credit experience
    fn add_xp(&mut self, amount: u64, source: XpSource) -> LevelChange;

    /// Credit currency
    fn add_coins(&mut self, amount: u64);

    /// Record one finished attempt. `time` is in simulation seconds.
    fn record_recipe_completion(&mut self, recipe_id: &str, score: u32, stars: u8, time: f64);

    /// True if the recipe has never been completed before
    fn is_first_completion(&self, _recipe_id: &str) -> bool {
        false
    }
}

/// Sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgression;

impl ProgressionSink for NullProgression {
    fn add_xp(&mut self, amount: u64, _source: XpSource) -> LevelChange {
        LevelChange {
            xp_awarded: amount,
            ..LevelChange::default()
        }
    }

    fn add_coins(&mut self, _amount: u64) {}

    fn record_recipe_completion(&mut self, _recipe_id: &str, _score: u32, _stars: u8, _time: f64) {}
}

impl<P: ProgressionSink + ?Sized> ProgressionSink for &mut P {
    fn add_xp(&mut self, amount: u64, source: XpSource) -> LevelChange {
        (**self).add_xp(amount, source)
    }

    fn add_coins(&mut self, amount: u64) {
        (**self).add_coins(amount)
    }

    fn record_recipe_completion(&mut self, recipe_id: &str, score: u32, stars: u8, time: f64) {
        (**self).record_recipe_completion(recipe_id, score, stars, time)
    }

    fn is_first_completion(&self, recipe_id: &str) -> bool {
        (**self).is_first_completion(recipe_id)
    }
}
