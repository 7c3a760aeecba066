//! Recipe data model
//!
//! `Recipe` is the single canonical shape. The simplified listing shape
//! (`RecipeSummary`) is always derived from it, never authored separately.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sous_minigames::{MiniGameConfig, MiniGameKind};

use crate::types::{
    Allergens, CameraAngle, CookingAction, Cuisine, Difficulty, DifficultyTier, HealthTags,
    IngredientCategory, Nutrition, RecipeCategory,
};
use crate::{RecipeError, RecipeResult};

/// Ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: IngredientCategory,
    /// Coin cost per unit of quantity
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl Ingredient {
    pub fn line_cost(&self) -> f64 {
        self.cost * self.quantity
    }
}

/// Step identifier, unique within its recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u32);

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One step of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub id: StepId,
    pub action: CookingAction,
    pub title: String,
    pub instruction: String,
    /// `None` makes this a pass-through step
    #[serde(default)]
    pub mini_game: Option<MiniGameConfig>,
    pub camera: CameraAngle,
    /// Expected duration in seconds
    pub duration: f64,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub technique: Option<String>,
    /// Set once the step has been scored in the current attempt
    #[serde(default)]
    pub completed: bool,
    /// Last score attributed to this step, 0 to 100
    #[serde(default)]
    pub score: u32,
}

impl RecipeStep {
    pub fn mini_game_kind(&self) -> Option<MiniGameKind> {
        self.mini_game.map(|m| m.kind)
    }

    pub fn is_pass_through(&self) -> bool {
        self.mini_game.is_none()
    }
}

/// What the player needs before a recipe can be cooked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRequirements {
    pub player_level: u32,
    pub coin_cost: u64,
    /// Recipe ids that must be completed first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

/// Base yield of a completed recipe, before star and first-time bonuses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub base_xp: u64,
    pub base_coins: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<String>,
}

/// A complete recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: RecipeCategory,
    pub cuisine: Cuisine,
    pub difficulty: Difficulty,
    /// Minutes
    pub prep_time: u32,
    /// Minutes
    pub cook_time: u32,
    pub servings: u32,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub health_tags: HealthTags,
    #[serde(default)]
    pub allergens: Allergens,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<RecipeStep>,
    #[serde(default)]
    pub unlock: UnlockRequirements,
    #[serde(default)]
    pub rewards: Rewards,
    /// Best star rating achieved so far, 0 to 3
    #[serde(default)]
    pub best_stars: u8,
}

impl Recipe {
    /// Prep plus cook time in minutes
    pub fn total_time(&self) -> u32 {
        self.prep_time + self.cook_time
    }

    /// Sum of cost × quantity over every ingredient
    pub fn total_cost(&self) -> f64 {
        self.ingredients.iter().map(Ingredient::line_cost).sum()
    }

    pub fn step(&self, id: StepId) -> Option<&RecipeStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Number of steps gated by a mini-game
    pub fn mini_game_count(&self) -> usize {
        self.steps.iter().filter(|s| s.mini_game.is_some()).count()
    }

    /// Sum of the step scores recorded in this copy
    pub fn step_score_total(&self) -> u32 {
        self.steps.iter().map(|s| s.score).sum()
    }

    pub fn is_free(&self) -> bool {
        self.unlock.coin_cost == 0
    }

    /// Deep copy with every step's runtime fields cleared
    pub fn fresh_copy(&self) -> Recipe {
        let mut copy = self.clone();
        for step in &mut copy.steps {
            step.completed = false;
            step.score = 0;
        }
        copy
    }

    /// Case-insensitive substring match over name, description and ingredient names
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .ingredients
                .iter()
                .any(|i| i.name.to_lowercase().contains(&needle))
    }

    /// Check structural invariants
    pub fn validate(&self) -> RecipeResult<()> {
        if self.id.trim().is_empty() {
            return Err(RecipeError::MissingId);
        }
        let invalid = |reason: String| RecipeError::Invalid {
            recipe: self.id.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".into()));
        }
        if self.steps.is_empty() {
            return Err(invalid("recipe has no steps".into()));
        }
        if self.ingredients.is_empty() {
            return Err(invalid("recipe has no ingredients".into()));
        }
        if self.best_stars > 3 {
            return Err(invalid(format!("best_stars {} is above 3", self.best_stars)));
        }

        let mut seen = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if !seen.insert(step.id) {
                return Err(invalid(format!("duplicate step id {}", step.id)));
            }
            if !step.duration.is_finite() || step.duration < 0.0 {
                return Err(invalid(format!("step {} has duration {}", step.id, step.duration)));
            }
            if let Some(config) = &step.mini_game {
                config.validate().map_err(|source| RecipeError::MiniGame {
                    recipe: self.id.clone(),
                    step: step.id,
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Simplified listing projection
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category,
            difficulty: self.difficulty.tier(),
            ingredients: self.ingredients.iter().map(|i| i.name.clone()).collect(),
            step_count: self.steps.len(),
            best_stars: self.best_stars,
        }
    }
}

/// Simplified recipe listing, derived from a full `Recipe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub category: RecipeCategory,
    pub difficulty: DifficultyTier,
    pub ingredients: Vec<String>,
    pub step_count: usize,
    pub best_stars: u8,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sous_minigames::MiniGameError;

    pub(crate) fn sample_recipe() -> Recipe {
        Recipe {
            id: "toast".into(),
            name: "Buttered Toast".into(),
            description: "Crisp bread with butter".into(),
            category: RecipeCategory::Breakfast,
            cuisine: Cuisine::American,
            difficulty: Difficulty::new(1).unwrap(),
            prep_time: 2,
            cook_time: 3,
            servings: 1,
            nutrition: Nutrition::default(),
            health_tags: HealthTags::VEGETARIAN,
            allergens: Allergens::GLUTEN | Allergens::DAIRY,
            ingredients: vec![
                Ingredient {
                    id: "bread".into(),
                    name: "Bread".into(),
                    quantity: 2.0,
                    unit: "slices".into(),
                    category: IngredientCategory::Grain,
                    cost: 3.0,
                    notes: None,
                    optional: false,
                },
                Ingredient {
                    id: "butter".into(),
                    name: "Butter".into(),
                    quantity: 0.5,
                    unit: "tbsp".into(),
                    category: IngredientCategory::Fat,
                    cost: 4.0,
                    notes: None,
                    optional: false,
                },
            ],
            steps: vec![
                RecipeStep {
                    id: StepId(1),
                    action: CookingAction::Cook,
                    title: "Toast".into(),
                    instruction: "Toast the bread".into(),
                    mini_game: Some(MiniGameConfig::new(MiniGameKind::HeatControl, 1)),
                    camera: CameraAngle::Side,
                    duration: 20.0,
                    tips: vec![],
                    technique: None,
                    completed: true,
                    score: 80,
                },
                RecipeStep {
                    id: StepId(2),
                    action: CookingAction::Plate,
                    title: "Serve".into(),
                    instruction: "Butter and serve".into(),
                    mini_game: None,
                    camera: CameraAngle::Overhead,
                    duration: 5.0,
                    tips: vec![],
                    technique: None,
                    completed: false,
                    score: 0,
                },
            ],
            unlock: UnlockRequirements::default(),
            rewards: Rewards {
                base_xp: 20,
                base_coins: 10,
                achievements: vec![],
            },
            best_stars: 0,
        }
    }

    #[test]
    fn test_derived_totals() {
        let recipe = sample_recipe();
        assert_eq!(recipe.total_time(), 5);
        assert_eq!(recipe.total_cost(), 8.0);
        assert_eq!(recipe.mini_game_count(), 1);
        assert!(recipe.steps[1].is_pass_through());
    }

    #[test]
    fn test_validate() {
        assert!(sample_recipe().validate().is_ok());

        let mut recipe = sample_recipe();
        recipe.steps.clear();
        assert!(matches!(recipe.validate(), Err(RecipeError::Invalid { .. })));

        let mut recipe = sample_recipe();
        recipe.steps[1].id = StepId(1);
        let err = recipe.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate step id 1"));

        let mut recipe = sample_recipe();
        recipe.id = "  ".into();
        assert_eq!(recipe.validate(), Err(RecipeError::MissingId));

        let mut recipe = sample_recipe();
        recipe.ingredients.clear();
        assert!(recipe.validate().is_err());

        for duration in [-1.0, f64::NAN, f64::INFINITY] {
            let mut recipe = sample_recipe();
            recipe.steps[1].duration = duration;
            let err = recipe.validate().unwrap_err();
            assert!(err.to_string().contains("step 2 has duration"), "{err}");
        }

        let mut recipe = sample_recipe();
        recipe.steps[1].duration = 0.0;
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_validate_mini_game_binding() {
        let mut recipe = sample_recipe();
        recipe.steps[0].mini_game = Some(MiniGameConfig::new(MiniGameKind::Chopping, 7));
        assert_eq!(
            recipe.validate(),
            Err(RecipeError::MiniGame {
                recipe: "toast".into(),
                step: StepId(1),
                source: MiniGameError::InvalidDifficulty(7),
            })
        );
    }

    #[test]
    fn test_fresh_copy_clears_runtime_state() {
        let recipe = sample_recipe();
        let copy = recipe.fresh_copy();
        assert!(copy.steps.iter().all(|s| !s.completed && s.score == 0));
        // Source is untouched
        assert!(recipe.steps[0].completed);
        assert_eq!(recipe.steps[0].score, 80);
        assert_eq!(copy.steps[0].id, recipe.steps[0].id);
    }

    #[test]
    fn test_mentions() {
        let recipe = sample_recipe();
        assert!(recipe.mentions("BUTTER"));
        assert!(recipe.mentions("crisp"));
        assert!(recipe.mentions(""));
        assert!(!recipe.mentions("avocado"));
    }

    #[test]
    fn test_summary_projection() {
        let summary = sample_recipe().summary();
        assert_eq!(summary.difficulty, DifficultyTier::Easy);
        assert_eq!(summary.ingredients, vec!["Bread".to_string(), "Butter".to_string()]);
        assert_eq!(summary.step_count, 2);
    }
}
