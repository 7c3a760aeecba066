//! Achievements
//!
//! Progress is recomputed from the profile and lifetime statistics, so it
//! never drifts from the records it is derived from.

use serde::{Deserialize, Serialize};

use crate::profile::Progression;
use crate::save::Statistics;

/// Seconds under which a recipe counts as speedy
pub const SPEEDY_TIME: f64 = 120.0;

/// One achievement and its progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unlocked: bool,
    /// Unix seconds
    pub unlocked_at: Option<u64>,
    pub progress: u32,
    pub target: u32,
}

impl Achievement {
    fn new(id: &str, name: &str, description: &str, target: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            unlocked: false,
            unlocked_at: None,
            progress: 0,
            target,
        }
    }
}

/// The achievement set of a fresh save
pub fn default_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new("first_recipe", "First Steps", "Complete your first recipe", 1),
        Achievement::new("master_chef", "Master Chef", "Get 3 stars on 10 recipes", 10),
        Achievement::new("speedy_cook", "Speedy Cook", "Complete a recipe in under 2 minutes", 1),
        Achievement::new("perfectionist", "Perfectionist", "Score 100 on a mini-game", 1),
        Achievement::new("recipe_collector", "Recipe Collector", "Complete 25 different recipes", 25),
    ]
}

fn measure(id: &str, profile: &Progression, stats: &Statistics) -> Option<u32> {
    let recipes = profile.recipes.values();
    let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
    match id {
        "first_recipe" => Some(stats.total_recipes_completed),
        "master_chef" => Some(count(recipes.filter(|r| r.best_stars >= 3).count())),
        "speedy_cook" => Some(count(
            recipes
                .filter(|r| r.best_time.is_some_and(|t| t < SPEEDY_TIME))
                .count(),
        )),
        "perfectionist" => Some(stats.perfect_mini_games),
        "recipe_collector" => Some(count(profile.recipes.len())),
        _ => None,
    }
}

/// Update progress and unlock anything that reached its target.
/// Returns the ids unlocked by this call.
pub fn refresh(
    achievements: &mut [Achievement],
    profile: &Progression,
    stats: &Statistics,
    now: u64,
) -> Vec<String> {
    let mut unlocked = Vec::new();
    for achievement in achievements.iter_mut() {
        let Some(progress) = measure(&achievement.id, profile, stats) else {
            continue;
        };
        achievement.progress = progress.min(achievement.target);
        if !achievement.unlocked && progress >= achievement.target {
            achievement.unlocked = true;
            achievement.unlocked_at = Some(now);
            log::info!("Achievement unlocked: {}", achievement.name);
            unlocked.push(achievement.id.clone());
        }
    }
    unlocked
}
