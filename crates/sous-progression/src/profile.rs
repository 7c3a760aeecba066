//! Player progression
//!
//! Levels, XP, coins, daily streaks and per-recipe records. The XP curve,
//! milestone table and chef titles are fixed game data.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sous_core::{LevelChange, ProgressionSink, XpSource};
use sous_recipes::{Recipe, UnlockRequirements};

use crate::{ProgressionError, ProgressionResult};

/// Highest reachable level
pub const MAX_LEVEL: u32 = 50;
/// Coins a fresh profile starts with
pub const STARTING_COINS: u64 = 100;
/// Longest counted daily streak
pub const MAX_STREAK: u32 = 7;
/// XP multiplier gained per streak day
pub const STREAK_STEP: f64 = 0.1;
/// Largest streak multiplier
pub const MAX_STREAK_MULTIPLIER: f64 = 1.5;

/// XP needed to go from `level` to `level + 1`
pub fn xp_for_level(level: u32) -> u64 {
    let l = level as f64;
    (200.0 * l + 50.0 * l.powf(1.5)).floor() as u64
}

/// XP accumulated over all levels below `level`
pub fn total_xp_to_level(level: u32) -> u64 {
    (1..level).map(xp_for_level).sum()
}

/// XP multiplier for a daily streak
pub fn streak_multiplier(streak: u32) -> f64 {
    (1.0 + streak as f64 * STREAK_STEP).min(MAX_STREAK_MULTIPLIER)
}

/// Rewards granted on reaching a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub level: u32,
    pub bonus_coins: u64,
    pub recipes: &'static [&'static str],
    pub reward: Option<&'static str>,
}

const fn milestone(level: u32, bonus_coins: u64, recipes: &'static [&'static str]) -> Milestone {
    Milestone {
        level,
        bonus_coins,
        recipes,
        reward: None,
    }
}

const fn special(level: u32, bonus_coins: u64, recipes: &'static [&'static str], reward: &'static str) -> Milestone {
    Milestone {
        level,
        bonus_coins,
        recipes,
        reward: Some(reward),
    }
}

/// Milestones in level order. Level 1 holds the starter recipes.
pub const MILESTONES: &[Milestone] = &[
    milestone(1, 0, &["scrambled_eggs", "pancakes", "caesar_salad", "grilled_cheese", "guacamole"]),
    milestone(2, 50, &["club_sandwich", "tomato_soup", "pasta_marinara"]),
    milestone(3, 75, &["omelette", "chicken_wrap"]),
    special(4, 100, &["beef_stirfry", "chicken_stirfry", "chocolate_cake"], "New apron unlocked!"),
    milestone(5, 125, &[]),
    milestone(6, 150, &[]),
    milestone(7, 175, &["tiramisu"]),
    special(8, 200, &["gourmet_steak"], "Chef hat unlocked!"),
    special(10, 300, &[], "Kitchen theme unlocked!"),
    milestone(15, 500, &[]),
    special(20, 750, &[], "Gold knife unlocked!"),
    milestone(25, 1000, &[]),
    milestone(30, 1500, &[]),
    special(35, 2000, &[], "Master Chef badge!"),
    milestone(40, 2500, &[]),
    milestone(45, 3000, &[]),
    special(50, 5000, &[], "Legendary status achieved!"),
];

/// Milestone reached exactly at `level`, if any
pub fn milestone_at(level: u32) -> Option<&'static Milestone> {
    MILESTONES.iter().find(|m| m.level == level)
}

/// Recipes a fresh profile can cook
pub fn starter_recipes() -> &'static [&'static str] {
    MILESTONES[0].recipes
}

/// Rank shown next to the player's level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChefTitle {
    KitchenNovice,
    ApprenticeCook,
    HomeChef,
    SkilledCook,
    SeniorChef,
    ExpertChef,
    MasterChef,
    ExecutiveChef,
    CulinaryArtist,
    LegendaryChef,
}

impl ChefTitle {
    pub fn for_level(level: u32) -> Self {
        match level {
            50.. => Self::LegendaryChef,
            45.. => Self::CulinaryArtist,
            40.. => Self::ExecutiveChef,
            35.. => Self::MasterChef,
            28.. => Self::ExpertChef,
            20.. => Self::SeniorChef,
            14.. => Self::SkilledCook,
            8.. => Self::HomeChef,
            4.. => Self::ApprenticeCook,
            _ => Self::KitchenNovice,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::KitchenNovice => "Kitchen Novice",
            Self::ApprenticeCook => "Apprentice Cook",
            Self::HomeChef => "Home Chef",
            Self::SkilledCook => "Skilled Cook",
            Self::SeniorChef => "Senior Chef",
            Self::ExpertChef => "Expert Chef",
            Self::MasterChef => "Master Chef",
            Self::ExecutiveChef => "Executive Chef",
            Self::CulinaryArtist => "Culinary Artist",
            Self::LegendaryChef => "Legendary Chef",
        }
    }
}

impl std::fmt::Display for ChefTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Best results for one recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeStats {
    pub times_cooked: u32,
    pub best_score: u32,
    pub best_stars: u8,
    /// Fastest completion in seconds
    pub best_time: Option<f64>,
}

impl RecipeStats {
    fn record(&mut self, score: u32, stars: u8, time: f64) {
        self.times_cooked += 1;
        self.best_score = self.best_score.max(score);
        self.best_stars = self.best_stars.max(stars);
        self.best_time = Some(self.best_time.map_or(time, |best| best.min(time)));
    }
}

/// Persistent player progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    pub level: u32,
    /// XP towards the next level
    pub current_xp: u64,
    /// XP earned over the profile's lifetime
    pub total_xp: u64,
    pub coins: u64,
    pub streak: u32,
    /// Day number (days since the Unix epoch) of the last streak update
    pub last_played_day: Option<i64>,
    pub recipes: BTreeMap<String, RecipeStats>,
    pub unlocked: BTreeSet<String>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            total_xp: 0,
            coins: STARTING_COINS,
            streak: 0,
            last_played_day: None,
            recipes: BTreeMap::new(),
            unlocked: starter_recipes().iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> ChefTitle {
        ChefTitle::for_level(self.level)
    }

    /// XP needed to finish the current level
    pub fn xp_for_next_level(&self) -> u64 {
        xp_for_level(self.level)
    }

    /// Progress through the current level, 0 to 100
    pub fn level_progress_percent(&self) -> f64 {
        let needed = self.xp_for_next_level().max(1);
        (self.current_xp as f64 / needed as f64 * 100.0).min(100.0)
    }

    pub fn streak_multiplier(&self) -> f64 {
        streak_multiplier(self.streak)
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.coins >= cost
    }

    pub fn spend_coins(&mut self, amount: u64) -> ProgressionResult<()> {
        if !self.can_afford(amount) {
            return Err(ProgressionError::InsufficientCoins {
                needed: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        Ok(())
    }

    pub fn is_unlocked(&self, recipe_id: &str) -> bool {
        self.unlocked.contains(recipe_id)
    }

    /// Mark a recipe unlocked; returns false if it already was
    pub fn unlock_recipe(&mut self, recipe_id: &str) -> bool {
        self.unlocked.insert(recipe_id.to_string())
    }

    /// Check a recipe's requirements without changing anything
    pub fn check_requirements(&self, recipe_id: &str, requirements: &UnlockRequirements) -> ProgressionResult<()> {
        if self.is_unlocked(recipe_id) {
            return Err(ProgressionError::AlreadyUnlocked(recipe_id.to_string()));
        }
        if self.level < requirements.player_level {
            return Err(ProgressionError::LevelTooLow {
                required: requirements.player_level,
                level: self.level,
            });
        }
        if let Some(missing) = requirements
            .prerequisites
            .iter()
            .find(|id| !self.recipes.contains_key(id.as_str()))
        {
            return Err(ProgressionError::MissingPrerequisite(missing.clone()));
        }
        if !self.can_afford(requirements.coin_cost) {
            return Err(ProgressionError::InsufficientCoins {
                needed: requirements.coin_cost,
                available: self.coins,
            });
        }
        Ok(())
    }

    /// Buy a recipe with coins once its level and prerequisites are met
    pub fn purchase(&mut self, recipe: &Recipe) -> ProgressionResult<()> {
        self.check_requirements(&recipe.id, &recipe.unlock)?;
        self.spend_coins(recipe.unlock.coin_cost)?;
        self.unlock_recipe(&recipe.id);
        log::info!("Unlocked '{}' for {} coins", recipe.id, recipe.unlock.coin_cost);
        Ok(())
    }

    /// Register play on `day`. Consecutive days extend the streak, gaps reset it.
    pub fn update_streak(&mut self, day: i64) {
        match self.last_played_day {
            Some(last) if last == day => return,
            Some(last) if last + 1 == day => {
                self.streak = (self.streak + 1).min(MAX_STREAK);
                log::info!("Streak extended to {} days", self.streak);
            }
            _ => {
                self.streak = 1;
                log::debug!("Streak reset to 1");
            }
        }
        self.last_played_day = Some(day);
    }

    pub fn stats(&self, recipe_id: &str) -> Option<&RecipeStats> {
        self.recipes.get(recipe_id)
    }

    /// Back to a fresh profile
    pub fn reset(&mut self) {
        *self = Self::default();
        log::info!("Progression reset");
    }

    /// Check invariants of loaded data
    pub fn validate(&self) -> ProgressionResult<()> {
        if !(1..=MAX_LEVEL).contains(&self.level) {
            return Err(ProgressionError::Corrupt(format!("level {} out of range", self.level)));
        }
        if self.streak > MAX_STREAK {
            return Err(ProgressionError::Corrupt(format!("streak {} above {}", self.streak, MAX_STREAK)));
        }
        if let Some((id, _)) = self.recipes.iter().find(|(_, s)| s.best_stars > 3) {
            return Err(ProgressionError::Corrupt(format!("recipe '{id}' has more than 3 stars")));
        }
        Ok(())
    }

    fn apply_milestone(&mut self, level: u32, change: &mut LevelChange) {
        let Some(milestone) = milestone_at(level) else {
            return;
        };
        self.coins += milestone.bonus_coins;
        change.milestone_coins += milestone.bonus_coins;
        for id in milestone.recipes {
            if self.unlock_recipe(id) {
                change.unlocked_recipes.push(id.to_string());
            }
        }
        if let Some(reward) = milestone.reward {
            log::info!("Level {level} reward: {reward}");
        }
    }
}

impl ProgressionSink for Progression {
    fn add_xp(&mut self, amount: u64, source: XpSource) -> LevelChange {
        let awarded = (amount as f64 * self.streak_multiplier()).floor() as u64;
        let mut change = LevelChange {
            xp_awarded: awarded,
            old_level: self.level,
            new_level: self.level,
            ..LevelChange::default()
        };

        self.current_xp += awarded;
        self.total_xp += awarded;
        while self.level < MAX_LEVEL && self.current_xp >= xp_for_level(self.level) {
            self.current_xp -= xp_for_level(self.level);
            self.level += 1;
            self.apply_milestone(self.level, &mut change);
        }
        change.new_level = self.level;

        log::info!(
            "Added {} XP ({} base, {:.2}x streak) from {}. Level {}, {}/{}",
            awarded,
            amount,
            self.streak_multiplier(),
            source,
            self.level,
            self.current_xp,
            self.xp_for_next_level()
        );
        if change.leveled_up() {
            log::info!("Level up: {} -> {} ({})", change.old_level, change.new_level, self.title());
        }
        change
    }

    fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    fn record_recipe_completion(&mut self, recipe_id: &str, score: u32, stars: u8, time: f64) {
        self.recipes
            .entry(recipe_id.to_string())
            .or_default()
            .record(score, stars.min(3), time);
    }

    fn is_first_completion(&self, recipe_id: &str) -> bool {
        self.recipes.get(recipe_id).is_none_or(|s| s.times_cooked == 0)
    }
}
