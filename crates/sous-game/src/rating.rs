//! Star rating and recipe rewards
//!
//! One threshold set (90 / 70 percent) decides stars everywhere, and the
//! reward multipliers are keyed off those stars.

use serde::{Deserialize, Serialize};
use sous_recipes::Rewards;

/// Percentage needed for three stars
pub const THREE_STAR_PERCENT: f64 = 90.0;
/// Percentage needed for two stars
pub const TWO_STAR_PERCENT: f64 = 70.0;

/// Share of the maximum attainable score, 0 to 100
pub fn score_percentage(total_score: u32, step_count: usize) -> f64 {
    if step_count == 0 {
        return 0.0;
    }
    total_score as f64 * 100.0 / (step_count as f64 * 100.0)
}

/// Stars for a finished attempt: 3 at 90 %, 2 at 70 %, otherwise 1
pub fn star_rating(total_score: u32, step_count: usize) -> u8 {
    stars_for_percentage(score_percentage(total_score, step_count))
}

pub fn stars_for_percentage(percentage: f64) -> u8 {
    if percentage >= THREE_STAR_PERCENT {
        3
    } else if percentage >= TWO_STAR_PERCENT {
        2
    } else {
        1
    }
}

/// Reward multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardTable {
    pub three_star_bonus: f64,
    pub two_star_bonus: f64,
    pub one_star_bonus: f64,
    /// XP multiplier the first time a recipe is completed
    pub first_completion_bonus: f64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            three_star_bonus: 1.5,
            two_star_bonus: 1.25,
            one_star_bonus: 1.0,
            first_completion_bonus: 1.5,
        }
    }
}

impl RewardTable {
    pub fn star_bonus(&self, stars: u8) -> f64 {
        match stars {
            3.. => self.three_star_bonus,
            2 => self.two_star_bonus,
            _ => self.one_star_bonus,
        }
    }

    /// XP and coins for a completion
    pub fn compute(&self, base: &Rewards, stars: u8, first_completion: bool) -> RecipeReward {
        let star_bonus = self.star_bonus(stars);
        let first_bonus = if first_completion {
            self.first_completion_bonus
        } else {
            1.0
        };
        RecipeReward {
            xp: (base.base_xp as f64 * star_bonus * first_bonus).floor() as u64,
            coins: (base.base_coins as f64 * star_bonus).floor() as u64,
            stars,
            first_completion,
        }
    }
}

/// What a finished attempt earns before the profile's own multipliers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeReward {
    pub xp: u64,
    pub coins: u64,
    pub stars: u8,
    pub first_completion: bool,
}

/// Rewards with the default table
pub fn compute_rewards(base: &Rewards, stars: u8, first_completion: bool) -> RecipeReward {
    RewardTable::default().compute(base, stars, first_completion)
}
