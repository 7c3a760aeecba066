//! Recipe orchestrator
//!
//! The state machine that walks a recipe's steps. It is the only writer of
//! the phase, the step index and the running total; mini-game sessions feed
//! it one score per bound step.

use serde::{Deserialize, Serialize};
use sous_core::DeltaTime;
use sous_minigames::{MiniGameConfig, MiniGameKind, Score};
use sous_recipes::{Recipe, RecipeStep};

use crate::rating::{score_percentage, star_rating};
use crate::{GameError, GameResult};

/// Score credited to a step with no mini-game
pub const PASS_THROUGH_SCORE: u32 = 100;

/// Top-level game phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Menu,
    RecipeSelect,
    Cooking,
    MiniGame,
    RecipeComplete,
}

impl GamePhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::RecipeSelect => "recipe_select",
            Self::Cooking => "cooking",
            Self::MiniGame => "mini_game",
            Self::RecipeComplete => "recipe_complete",
        }
    }

    /// True while a recipe attempt is under way
    pub fn is_in_recipe(&self) -> bool {
        matches!(self, Self::Cooking | Self::MiniGame)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Camera framing requested from the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPreset {
    #[default]
    Wide,
    Cutting,
    Stove,
    Closeup,
    Overhead,
}

impl CameraPreset {
    /// Framing that suits a mini-game
    pub fn for_mini_game(kind: Option<MiniGameKind>) -> Self {
        match kind {
            Some(MiniGameKind::Chopping) => Self::Cutting,
            Some(MiniGameKind::HeatControl) => Self::Stove,
            Some(MiniGameKind::Stirring | MiniGameKind::Measuring) => Self::Closeup,
            Some(MiniGameKind::Plating) => Self::Overhead,
            None => Self::Wide,
        }
    }
}

/// Final figures of a completed attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub total_score: u32,
    /// 0 to 100
    pub percentage: f64,
    pub stars: u8,
    /// Simulation seconds spent on the attempt
    pub elapsed: f64,
}

/// Where the machine went after a step was scored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Advance {
    /// Moved to the step at `index`
    Step {
        index: usize,
        mini_game: Option<MiniGameKind>,
    },
    /// That was the last step
    Complete(Completion),
}

/// Read-only view of the orchestrator for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub recipe_id: Option<String>,
    pub current_mini_game: Option<MiniGameKind>,
    pub current_step_index: usize,
    pub step_count: usize,
    pub total_score: u32,
    pub star_rating: u8,
    pub temperature: f64,
    pub mixing_progress: f64,
    pub chopping_score: u32,
    pub time_remaining: f64,
    pub elapsed: f64,
    pub paused: bool,
    pub camera: CameraPreset,
}

/// Recipe orchestration state machine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookingGame {
    phase: GamePhase,
    /// Session-local copy of the selected recipe
    recipe: Option<Recipe>,
    current_step_index: usize,
    current_mini_game: Option<MiniGameKind>,
    total_score: u32,
    star_rating: u8,
    temperature: f64,
    mixing_progress: f64,
    chopping_score: u32,
    /// Seconds left on the current step's expected duration
    time_remaining: f64,
    /// Set once the current step's expiry has been reported
    step_expired: bool,
    /// Simulation seconds since the recipe was selected
    elapsed: f64,
    paused: bool,
    camera: CameraPreset,
}

impl CookingGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The session copy of the recipe being cooked
    pub fn recipe(&self) -> Option<&Recipe> {
        self.recipe.as_ref()
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn current_step(&self) -> Option<&RecipeStep> {
        if !self.phase.is_in_recipe() {
            return None;
        }
        self.recipe.as_ref()?.steps.get(self.current_step_index)
    }

    pub fn current_mini_game(&self) -> Option<MiniGameKind> {
        self.current_mini_game
    }

    /// Binding of the step waiting for a mini-game, if any
    pub fn current_mini_game_config(&self) -> Option<MiniGameConfig> {
        if self.phase != GamePhase::MiniGame {
            return None;
        }
        self.current_step()?.mini_game
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// 0 until the recipe completes
    pub fn star_rating(&self) -> u8 {
        self.star_rating
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn mixing_progress(&self) -> f64 {
        self.mixing_progress
    }

    pub fn chopping_score(&self) -> u32 {
        self.chopping_score
    }

    pub fn time_remaining(&self) -> f64 {
        self.time_remaining
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn camera_preset(&self) -> CameraPreset {
        self.camera
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            recipe_id: self.recipe.as_ref().map(|r| r.id.clone()),
            current_mini_game: self.current_mini_game,
            current_step_index: self.current_step_index,
            step_count: self.recipe.as_ref().map_or(0, |r| r.steps.len()),
            total_score: self.total_score,
            star_rating: self.star_rating,
            temperature: self.temperature,
            mixing_progress: self.mixing_progress,
            chopping_score: self.chopping_score,
            time_remaining: self.time_remaining,
            elapsed: self.elapsed,
            paused: self.paused,
            camera: self.camera,
        }
    }

    /// Open recipe selection, abandoning any attempt in progress
    pub fn go_to_recipe_select(&mut self) {
        let from = self.phase;
        *self = Self {
            phase: GamePhase::RecipeSelect,
            ..Self::default()
        };
        log::info!("Phase {} -> {}", from, self.phase);
    }

    /// Start cooking a copy of `recipe`
    pub fn select_recipe(&mut self, recipe: &Recipe) -> GameResult<GamePhase> {
        if !matches!(self.phase, GamePhase::RecipeSelect | GamePhase::RecipeComplete) {
            log::warn!("Ignoring recipe selection in phase {}", self.phase);
            return Err(GameError::InvalidPhase {
                action: "select_recipe",
                phase: self.phase,
            });
        }
        if recipe.steps.is_empty() {
            log::warn!("Rejecting recipe '{}' with no steps", recipe.id);
            return Err(GameError::EmptyRecipe(recipe.id.clone()));
        }

        *self = Self {
            recipe: Some(recipe.fresh_copy()),
            ..Self::default()
        };
        self.enter_step(0);
        log::info!(
            "Recipe selected: {} ({} steps), starting in {}",
            recipe.name,
            recipe.steps.len(),
            self.phase
        );
        Ok(self.phase)
    }

    /// Record the active mini-game's score on the current step and move on
    pub fn complete_mini_game_and_advance(&mut self, score: Score) -> GameResult<Advance> {
        if self.phase != GamePhase::MiniGame {
            log::warn!("Ignoring mini-game completion in phase {}", self.phase);
            return Err(GameError::InvalidPhase {
                action: "complete_mini_game_and_advance",
                phase: self.phase,
            });
        }
        self.complete_step(score.value())
    }

    /// Finish the current pass-through step and move on
    pub fn advance_step(&mut self) -> GameResult<Advance> {
        if self.phase != GamePhase::Cooking {
            log::warn!("Ignoring step advance in phase {}", self.phase);
            return Err(GameError::InvalidPhase {
                action: "advance_step",
                phase: self.phase,
            });
        }
        self.complete_step(PASS_THROUGH_SCORE)
    }

    /// Clamped to 0..=100
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = clamp_unit_range(temperature);
    }

    /// Clamped to 0..=100
    pub fn set_mixing_progress(&mut self, progress: f64) {
        self.mixing_progress = clamp_unit_range(progress);
    }

    pub fn add_chopping_score(&mut self, points: u32) {
        self.chopping_score = self.chopping_score.saturating_add(points);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::debug!("Paused: {}", self.paused);
        self.paused
    }

    pub fn set_camera_preset(&mut self, preset: CameraPreset) {
        self.camera = preset;
    }

    /// Advance the step timer and the attempt clock. Returns true on the tick
    /// the current step's expected duration runs out, which is the first tick
    /// for a zero-length step.
    pub fn tick(&mut self, dt: DeltaTime) -> bool {
        if self.paused || !self.phase.is_in_recipe() {
            return false;
        }
        let secs = dt.as_secs().max(0.0);
        self.elapsed += secs;
        if self.step_expired {
            return false;
        }
        self.time_remaining = (self.time_remaining - secs).max(0.0);
        self.step_expired = self.time_remaining == 0.0;
        self.step_expired
    }

    /// Back to the main menu with every field at its default. Always legal.
    pub fn reset_game(&mut self) {
        *self = Self::default();
        log::info!("Game reset");
    }

    fn enter_step(&mut self, index: usize) {
        let Some(step) = self.recipe.as_ref().and_then(|r| r.steps.get(index)) else {
            return;
        };
        let mini_game = step.mini_game_kind();
        self.current_step_index = index;
        self.current_mini_game = mini_game;
        self.time_remaining = step.duration.max(0.0);
        self.step_expired = false;
        self.temperature = 0.0;
        self.mixing_progress = 0.0;
        self.chopping_score = 0;
        self.camera = CameraPreset::for_mini_game(mini_game);
        self.phase = if mini_game.is_some() {
            GamePhase::MiniGame
        } else {
            GamePhase::Cooking
        };
    }

    fn complete_step(&mut self, score: u32) -> GameResult<Advance> {
        let index = self.current_step_index;
        let recipe = self.recipe.as_mut().ok_or(GameError::NoRecipe)?;
        let step_count = recipe.steps.len();
        let step = recipe.steps.get_mut(index).ok_or(GameError::NoRecipe)?;
        step.completed = true;
        step.score = score;
        self.total_score += score;
        log::info!(
            "Step {}/{} '{}' scored {}, total {}",
            index + 1,
            step_count,
            step.title,
            score,
            self.total_score
        );

        let next = index + 1;
        if next < step_count {
            self.enter_step(next);
            return Ok(Advance::Step {
                index: next,
                mini_game: self.current_mini_game,
            });
        }

        let stars = star_rating(self.total_score, step_count);
        let completion = Completion {
            total_score: self.total_score,
            percentage: score_percentage(self.total_score, step_count),
            stars,
            elapsed: self.elapsed,
        };
        recipe.best_stars = recipe.best_stars.max(stars);
        self.current_step_index = step_count;
        self.current_mini_game = None;
        self.star_rating = stars;
        self.camera = CameraPreset::Wide;
        self.phase = GamePhase::RecipeComplete;
        log::info!(
            "Recipe '{}' complete: {} points ({:.1}%), {} stars",
            recipe.id,
            completion.total_score,
            completion.percentage,
            stars
        );
        Ok(Advance::Complete(completion))
    }
}

fn clamp_unit_range(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sous_recipes::Catalog;

    fn bound_recipe(scores: usize) -> Recipe {
        let catalog = Catalog::builtin().unwrap();
        let mut recipe = catalog.get("omelette").unwrap().clone();
        recipe.steps.truncate(scores);
        recipe
    }

    fn selected(recipe: &Recipe) -> CookingGame {
        let mut game = CookingGame::new();
        game.go_to_recipe_select();
        game.select_recipe(recipe).unwrap();
        game
    }

    #[test]
    fn test_initial_state() {
        let game = CookingGame::new();
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.star_rating(), 0);
        assert!(game.recipe().is_none());
        assert!(game.current_step().is_none());
    }

    #[test]
    fn test_select_requires_recipe_select_phase() {
        let recipe = bound_recipe(3);
        let mut game = CookingGame::new();
        assert_eq!(
            game.select_recipe(&recipe),
            Err(GameError::InvalidPhase {
                action: "select_recipe",
                phase: GamePhase::Menu
            })
        );
        assert_eq!(game, CookingGame::new());
    }

    #[test]
    fn test_select_enters_first_step() {
        let recipe = bound_recipe(3);
        let game = selected(&recipe);
        assert_eq!(game.phase(), GamePhase::MiniGame);
        assert_eq!(game.current_step_index(), 0);
        assert_eq!(game.current_mini_game(), recipe.steps[0].mini_game_kind());
        assert_eq!(game.time_remaining(), recipe.steps[0].duration);
        assert_eq!(
            game.camera_preset(),
            CameraPreset::for_mini_game(recipe.steps[0].mini_game_kind())
        );
    }

    #[test]
    fn test_empty_recipe_is_rejected() {
        let mut recipe = bound_recipe(3);
        recipe.steps.clear();
        let mut game = CookingGame::new();
        game.go_to_recipe_select();
        let before = game.clone();
        assert_eq!(
            game.select_recipe(&recipe),
            Err(GameError::EmptyRecipe("omelette".into()))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_full_run_three_stars() {
        let recipe = bound_recipe(3);
        let mut game = selected(&recipe);

        for expected_index in 1..3 {
            let advance = game.complete_mini_game_and_advance(Score::MAX).unwrap();
            assert!(matches!(advance, Advance::Step { index, .. } if index == expected_index));
            assert_eq!(game.current_step_index(), expected_index);
            assert_eq!(game.star_rating(), 0);
        }
        let advance = game.complete_mini_game_and_advance(Score::MAX).unwrap();

        let Advance::Complete(done) = advance else {
            panic!("expected completion, got {advance:?}");
        };
        assert_eq!(done.total_score, 300);
        assert_eq!(done.percentage, 100.0);
        assert_eq!(done.stars, 3);
        assert_eq!(game.phase(), GamePhase::RecipeComplete);
        assert_eq!(game.star_rating(), 3);
        assert_eq!(game.current_step_index(), 3);

        let copy = game.recipe().unwrap();
        assert_eq!(copy.best_stars, 3);
        assert!(copy.steps.iter().all(|s| s.completed && s.score == 100));
        assert_eq!(copy.step_score_total(), game.total_score());
    }

    #[test]
    fn test_low_scores_one_star() {
        let recipe = bound_recipe(3);
        let mut game = selected(&recipe);
        for _ in 0..3 {
            game.complete_mini_game_and_advance(Score::from(60)).unwrap();
        }
        assert_eq!(game.total_score(), 180);
        assert_eq!(game.star_rating(), 1);
    }

    #[test]
    fn test_completion_outside_mini_game_is_ignored() {
        let recipe = bound_recipe(2);
        let mut game = selected(&recipe);
        game.complete_mini_game_and_advance(Score::MAX).unwrap();
        game.complete_mini_game_and_advance(Score::MAX).unwrap();
        assert_eq!(game.phase(), GamePhase::RecipeComplete);

        let before = game.clone();
        assert!(matches!(
            game.complete_mini_game_and_advance(Score::MAX),
            Err(GameError::InvalidPhase { .. })
        ));
        assert_eq!(game, before);
    }

    #[test]
    fn test_pass_through_steps() {
        let mut recipe = bound_recipe(3);
        recipe.steps[1].mini_game = None;
        let mut game = selected(&recipe);

        assert!(game.advance_step().is_err());
        let advance = game.complete_mini_game_and_advance(Score::from(80)).unwrap();
        assert_eq!(advance, Advance::Step { index: 1, mini_game: None });
        assert_eq!(game.phase(), GamePhase::Cooking);
        assert_eq!(game.camera_preset(), CameraPreset::Wide);
        assert!(game.current_mini_game_config().is_none());

        let advance = game.advance_step().unwrap();
        assert!(matches!(advance, Advance::Step { index: 2, mini_game: Some(_) }));
        assert_eq!(game.phase(), GamePhase::MiniGame);
        assert_eq!(game.recipe().unwrap().steps[1].score, PASS_THROUGH_SCORE);
        assert_eq!(game.total_score(), 180);
    }

    #[test]
    fn test_retry_does_not_carry_state() {
        let recipe = bound_recipe(2);
        let pristine = recipe.clone();
        let mut game = selected(&recipe);
        game.set_temperature(55.0);
        game.complete_mini_game_and_advance(Score::from(40)).unwrap();
        game.complete_mini_game_and_advance(Score::from(40)).unwrap();

        game.select_recipe(&recipe).unwrap();
        assert_eq!(game.total_score(), 0);
        assert_eq!(game.star_rating(), 0);
        assert_eq!(game.temperature(), 0.0);
        assert!(game.recipe().unwrap().steps.iter().all(|s| !s.completed && s.score == 0));
        assert_eq!(recipe, pristine);
    }

    #[test]
    fn test_step_advance_resets_transients() {
        let recipe = bound_recipe(3);
        let mut game = selected(&recipe);
        game.set_temperature(70.0);
        game.set_mixing_progress(40.0);
        game.add_chopping_score(12);
        game.complete_mini_game_and_advance(Score::from(90)).unwrap();
        assert_eq!(game.temperature(), 0.0);
        assert_eq!(game.mixing_progress(), 0.0);
        assert_eq!(game.chopping_score(), 0);
        assert_eq!(game.time_remaining(), recipe.steps[1].duration);
    }

    #[test]
    fn test_setters_clamp() {
        let mut game = CookingGame::new();
        game.set_temperature(250.0);
        assert_eq!(game.temperature(), 100.0);
        game.set_temperature(-4.0);
        assert_eq!(game.temperature(), 0.0);
        game.set_mixing_progress(f64::NAN);
        assert_eq!(game.mixing_progress(), 0.0);
        game.add_chopping_score(u32::MAX);
        game.add_chopping_score(5);
        assert_eq!(game.chopping_score(), u32::MAX);
    }

    #[test]
    fn test_tick_and_pause() {
        let recipe = bound_recipe(1);
        let mut game = selected(&recipe);
        let duration = game.time_remaining();

        assert!(!game.tick(DeltaTime(1.0)));
        assert_eq!(game.time_remaining(), duration - 1.0);
        assert_eq!(game.elapsed(), 1.0);

        game.toggle_pause();
        game.tick(DeltaTime(5.0));
        assert_eq!(game.time_remaining(), duration - 1.0);
        assert_eq!(game.elapsed(), 1.0);
        game.toggle_pause();

        assert!(game.tick(DeltaTime(duration)));
        assert_eq!(game.time_remaining(), 0.0);
        assert!(!game.tick(DeltaTime(1.0)));
        assert_eq!(game.elapsed(), duration + 2.0);
    }

    #[test]
    fn test_zero_length_step_expires_on_first_tick() {
        let mut recipe = bound_recipe(2);
        recipe.steps[0].mini_game = None;
        recipe.steps[0].duration = 0.0;
        let mut game = selected(&recipe);
        assert_eq!(game.time_remaining(), 0.0);

        assert!(game.tick(DeltaTime(0.0)));
        assert!(!game.tick(DeltaTime(1.0)));

        game.advance_step().unwrap();
        assert_eq!(game.current_step_index(), 1);
        assert!(!game.tick(DeltaTime(0.5)));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let recipe = bound_recipe(3);
        let mut game = selected(&recipe);
        game.complete_mini_game_and_advance(Score::from(70)).unwrap();
        game.toggle_pause();

        game.reset_game();
        let once = game.clone();
        game.reset_game();
        assert_eq!(game, once);
        assert_eq!(game, CookingGame::new());
    }

    #[test]
    fn test_snapshot() {
        let recipe = bound_recipe(3);
        let game = selected(&recipe);
        let snapshot = game.snapshot();
        assert_eq!(snapshot.phase, GamePhase::MiniGame);
        assert_eq!(snapshot.recipe_id.as_deref(), Some("omelette"));
        assert_eq!(snapshot.step_count, 3);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "mini_game");
    }
}
