//! Recipe catalog
//!
//! Read-only, insertion-ordered store of validated recipes with filtering
//! and sorting. Unlock and favourite state lives with the player profile.

use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::recipe::Recipe;
use crate::types::{Cuisine, Difficulty, HealthTags, RecipeCategory};
use crate::{CatalogError, CatalogResult, RecipeError};

/// Recipes shipped with the game
const BUILTIN_RECIPES: &str = include_str!("../data/recipes.json");

type RecipeMap = IndexMap<String, Recipe, ahash::RandomState>;

/// Filter over the catalog. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeQuery {
    pub category: Option<RecipeCategory>,
    pub cuisine: Option<Cuisine>,
    pub difficulty: Option<Difficulty>,
    /// Every tag here must be present
    pub tags: HealthTags,
    /// Total time in minutes
    pub total_time: Option<RangeInclusive<u32>>,
    pub search: Option<String>,
}

impl RecipeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: RecipeCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn cuisine(mut self, cuisine: Cuisine) -> Self {
        self.cuisine = Some(cuisine);
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn tag(mut self, tag: HealthTags) -> Self {
        self.tags |= tag;
        self
    }

    pub fn total_time(mut self, minutes: RangeInclusive<u32>) -> Self {
        self.total_time = Some(minutes);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.category.is_none_or(|c| recipe.category == c)
            && self.cuisine.is_none_or(|c| recipe.cuisine == c)
            && self.difficulty.is_none_or(|d| recipe.difficulty == d)
            && recipe.health_tags.contains(self.tags)
            && self
                .total_time
                .as_ref()
                .is_none_or(|range| range.contains(&recipe.total_time()))
            && self.search.as_deref().is_none_or(|text| recipe.mentions(text))
    }
}

/// Sort order for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Difficulty,
    Time,
    Category,
}

impl FromStr for SortKey {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "difficulty" => Ok(Self::Difficulty),
            "time" => Ok(Self::Time),
            "category" => Ok(Self::Category),
            other => Err(RecipeError::UnknownName {
                kind: "SortKey",
                name: other.to_string(),
            }),
        }
    }
}

/// Validated recipe collection
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: RecipeMap,
}

impl Catalog {
    /// The built-in recipe set
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_json(BUILTIN_RECIPES)
    }

    /// Parse a JSON array of recipes
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)?;
        Self::from_recipes(recipes)
    }

    /// Load a JSON recipe pack from disk
    pub fn from_path(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loading recipes from {}", path.display());
        Self::from_json(&json)
    }

    /// Build from recipes, validating each and rejecting duplicate ids
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> CatalogResult<Self> {
        let mut map = RecipeMap::default();
        for recipe in recipes {
            recipe.validate()?;
            if map.contains_key(&recipe.id) {
                return Err(CatalogError::DuplicateRecipe(recipe.id));
            }
            map.insert(recipe.id.clone(), recipe);
        }
        log::info!("Recipe catalog ready with {} recipes", map.len());
        Ok(Self { recipes: map })
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.recipes.contains_key(id)
    }

    /// Recipes in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes matching the query, in catalog order
    pub fn query(&self, query: &RecipeQuery) -> Vec<&Recipe> {
        self.iter().filter(|r| query.matches(r)).collect()
    }

    /// Every recipe sorted by `key`; ties keep catalog order
    pub fn sorted(&self, key: SortKey) -> Vec<&Recipe> {
        let mut recipes: Vec<_> = self.iter().collect();
        sort_recipes(&mut recipes, key);
        recipes
    }

    /// Recipes whose level requirement is met at `level`
    pub fn unlockable_at(&self, level: u32) -> Vec<&Recipe> {
        self.iter().filter(|r| r.unlock.player_level <= level).collect()
    }
}

/// Stable sort of a recipe listing
pub fn sort_recipes(recipes: &mut [&Recipe], key: SortKey) {
    match key {
        SortKey::Name => recipes.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::Difficulty => recipes.sort_by_key(|r| r.difficulty),
        SortKey::Time => recipes.sort_by_key(|r| r.total_time()),
        SortKey::Category => recipes.sort_by_key(|r| r.category),
    }
}
