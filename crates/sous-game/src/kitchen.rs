//! Kitchen
//!
//! Glue between the orchestrator and the live mini-game. The kitchen opens a
//! session whenever the machine enters a bound step, relays the session's
//! readout into the orchestrator, turns the final score into an advance and
//! pays out rewards once per completed attempt.

use serde::Serialize;
use sous_core::{
    DeltaTime, EventBus, FeedbackSink, LevelChange, Notice, NoticeLevel, NullFeedback,
    ProgressionSink, XpSource,
};
use sous_minigames::{MiniGameInput, MiniGameSession, Readout, Score};
use sous_recipes::Recipe;

use crate::events::GameEvent;
use crate::orchestrator::{Advance, Completion, CookingGame, GamePhase};
use crate::rating::{RecipeReward, RewardTable};
use crate::{GameError, GameResult};

/// Summary of a completed attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeReport {
    pub recipe_id: String,
    pub recipe_name: String,
    pub completion: Completion,
    pub step_scores: Vec<u32>,
    pub reward: RecipeReward,
    pub level: LevelChange,
}

/// One cooking station: orchestrator, live session and collaborators
pub struct Kitchen<P: ProgressionSink> {
    game: CookingGame,
    session: Option<MiniGameSession>,
    events: EventBus<GameEvent>,
    feedback: Box<dyn FeedbackSink>,
    progression: P,
    rewards: RewardTable,
    /// Pass-through steps advance on their own when their duration runs out
    auto_advance: bool,
    report: Option<RecipeReport>,
}

impl<P: ProgressionSink> Kitchen<P> {
    pub fn new(progression: P) -> Self {
        Self {
            game: CookingGame::new(),
            session: None,
            events: EventBus::new(),
            feedback: Box::new(NullFeedback),
            progression,
            rewards: RewardTable::default(),
            auto_advance: true,
            report: None,
        }
    }

    /// Route cosmetic feedback to `sink`
    pub fn with_feedback(mut self, sink: Box<dyn FeedbackSink>) -> Self {
        self.feedback = sink;
        self
    }

    pub fn with_reward_table(mut self, table: RewardTable) -> Self {
        self.rewards = table;
        self
    }

    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    pub fn game(&self) -> &CookingGame {
        &self.game
    }

    /// The live mini-game, if one is running
    pub fn session(&self) -> Option<&MiniGameSession> {
        self.session.as_ref()
    }

    pub fn events(&self) -> &EventBus<GameEvent> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus<GameEvent> {
        &mut self.events
    }

    pub fn progression(&self) -> &P {
        &self.progression
    }

    pub fn progression_mut(&mut self) -> &mut P {
        &mut self.progression
    }

    pub fn into_progression(self) -> P {
        self.progression
    }

    /// Result of the last completed attempt
    pub fn last_report(&self) -> Option<&RecipeReport> {
        self.report.as_ref()
    }

    /// Live mini-game values with the session clock
    pub fn readout(&self) -> Option<Readout> {
        self.session.as_ref().map(MiniGameSession::readout)
    }

    pub fn go_to_recipe_select(&mut self) {
        let from = self.game.phase();
        self.discard_session();
        self.game.go_to_recipe_select();
        self.phase_changed(from);
    }

    /// Begin an attempt at `recipe`. Legal from recipe selection or after a
    /// completed attempt.
    pub fn start_recipe(&mut self, recipe: &Recipe) -> GameResult<()> {
        let from = self.game.phase();
        self.game.select_recipe(recipe)?;
        self.discard_session();
        self.report = None;
        self.events.publish(&GameEvent::RecipeStarted {
            recipe_id: recipe.id.clone(),
            step_count: recipe.steps.len(),
        });
        self.phase_changed(from);
        self.open_session();
        Ok(())
    }

    /// Forward input to the live mini-game
    pub fn handle_input(&mut self, input: &MiniGameInput) {
        if let Some(session) = self.session.as_mut() {
            session.handle_input(input, self.feedback.as_mut());
        }
    }

    /// Finish the current pass-through step
    pub fn advance_step(&mut self) -> GameResult<Advance> {
        let index = self.game.current_step_index();
        let from = self.game.phase();
        let advance = self.game.advance_step()?;
        self.after_step(index, from, advance);
        Ok(advance)
    }

    pub fn toggle_pause(&mut self) -> bool {
        let paused = self.game.toggle_pause();
        if let Some(session) = self.session.as_mut() {
            if paused {
                session.pause();
            } else {
                session.resume();
            }
        }
        paused
    }

    /// Leave the running mini-game without a score and go back to recipe
    /// selection. The step is not advanced.
    pub fn cancel_mini_game(&mut self) -> GameResult<()> {
        if self.game.phase() != GamePhase::MiniGame {
            return Err(GameError::InvalidPhase {
                action: "cancel_mini_game",
                phase: self.game.phase(),
            });
        }
        self.go_to_recipe_select();
        Ok(())
    }

    /// Throw away the running mini-game and start the same step afresh
    pub fn restart_mini_game(&mut self) -> GameResult<()> {
        if self.game.phase() != GamePhase::MiniGame {
            return Err(GameError::InvalidPhase {
                action: "restart_mini_game",
                phase: self.game.phase(),
            });
        }
        self.discard_session();
        self.open_session();
        Ok(())
    }

    /// Advance one simulation tick
    pub fn tick(&mut self, dt: DeltaTime) {
        if self.game.is_paused() {
            return;
        }
        let step_expired = self.game.tick(dt);
        match self.game.phase() {
            GamePhase::MiniGame => self.tick_session(dt),
            GamePhase::Cooking if step_expired && self.auto_advance => {
                log::debug!("Pass-through step finished on its own");
                if let Err(e) = self.advance_step() {
                    log::warn!("Automatic advance failed: {e}");
                }
            }
            _ => {}
        }
    }

    /// Back to the main menu, discarding any attempt
    pub fn reset_game(&mut self) {
        let from = self.game.phase();
        self.discard_session();
        self.game.reset_game();
        self.report = None;
        self.phase_changed(from);
    }

    fn tick_session(&mut self, dt: DeltaTime) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let finished = session.tick(dt, self.feedback.as_mut());
        let readout = session.readout();
        let outcome = session.outcome().cloned();
        self.relay(&readout);

        let Some(score) = finished else {
            return;
        };
        self.session = None;
        let index = self.game.current_step_index();
        if let Some(outcome) = outcome {
            self.events.publish(&GameEvent::MiniGameFinished {
                step_index: index,
                outcome,
            });
        }
        self.complete_mini_game(index, score);
    }

    fn complete_mini_game(&mut self, index: usize, score: Score) {
        let from = self.game.phase();
        match self.game.complete_mini_game_and_advance(score) {
            Ok(advance) => self.after_step(index, from, advance),
            Err(e) => log::warn!("Mini-game score dropped: {e}"),
        }
    }

    fn after_step(&mut self, index: usize, from: GamePhase, advance: Advance) {
        let score = self
            .game
            .recipe()
            .and_then(|r| r.steps.get(index))
            .map_or(0, |s| s.score);
        self.events.publish(&GameEvent::StepCompleted {
            step_index: index,
            score,
            total_score: self.game.total_score(),
        });
        self.phase_changed(from);
        match advance {
            Advance::Step { .. } => self.open_session(),
            Advance::Complete(completion) => self.pay_out(completion),
        }
    }

    fn relay(&mut self, readout: &Readout) {
        if let Some(t) = readout.temperature {
            self.game.set_temperature(t);
        }
        if let Some(p) = readout.mixing_progress {
            self.game.set_mixing_progress(p);
        }
        if let Some(points) = readout.chopping_points {
            let delta = points.saturating_sub(self.game.chopping_score());
            if delta > 0 {
                self.game.add_chopping_score(delta);
            }
        }
    }

    fn open_session(&mut self) {
        let Some(config) = self.game.current_mini_game_config() else {
            return;
        };
        let mut session = MiniGameSession::from_config(&config);
        if self.game.is_paused() {
            session.pause();
        }
        self.session = Some(session);
        self.events.publish(&GameEvent::MiniGameStarted {
            step_index: self.game.current_step_index(),
            kind: config.kind,
        });
    }

    fn discard_session(&mut self) {
        if let Some(session) = self.session.take() {
            if !session.is_completed() {
                self.events.publish(&GameEvent::MiniGameCancelled {
                    step_index: self.game.current_step_index(),
                    kind: session.kind(),
                });
            }
            session.cancel();
        }
    }

    fn phase_changed(&mut self, from: GamePhase) {
        let to = self.game.phase();
        if from != to {
            self.events.publish(&GameEvent::PhaseChanged { from, to });
        }
    }

    fn pay_out(&mut self, completion: Completion) {
        let Some(recipe) = self.game.recipe() else {
            return;
        };
        let recipe_id = recipe.id.clone();
        let recipe_name = recipe.name.clone();
        let step_scores = recipe.steps.iter().map(|s| s.score).collect();
        let first = self.progression.is_first_completion(&recipe_id);
        let reward = self.rewards.compute(&recipe.rewards, completion.stars, first);

        let level = self
            .progression
            .add_xp(reward.xp, XpSource::Recipe(recipe_id.clone()));
        self.progression.add_coins(reward.coins);
        self.progression.record_recipe_completion(
            &recipe_id,
            completion.total_score,
            completion.stars,
            completion.elapsed,
        );

        self.events.publish(&GameEvent::RecipeCompleted {
            recipe_id: recipe_id.clone(),
            completion,
            reward,
            level: level.clone(),
        });
        self.events.publish(&GameEvent::Notice(
            Notice::new(NoticeLevel::Success, format!("{recipe_name} complete!")).with_message(format!(
                "{} stars, +{} XP, +{} coins",
                completion.stars, level.xp_awarded, reward.coins
            )),
        ));
        if level.leveled_up() {
            self.events.publish(&GameEvent::Notice(
                Notice::new(NoticeLevel::Achievement, "Level up!")
                    .with_message(format!("You reached level {}", level.new_level)),
            ));
        }

        self.report = Some(RecipeReport {
            recipe_id,
            recipe_name,
            completion,
            step_scores,
            reward,
            level,
        });
    }
}

impl<P: ProgressionSink> std::fmt::Debug for Kitchen<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kitchen")
            .field("game", &self.game)
            .field("session", &self.session)
            .field("events", &self.events)
            .field("auto_advance", &self.auto_advance)
            .field("report", &self.report)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sous_core::NullProgression;
    use sous_minigames::{Key, MiniGameConfig, MiniGameKind};
    use sous_recipes::Catalog;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: DeltaTime = DeltaTime(1.0 / 60.0);

    fn recipe(id: &str) -> Recipe {
        Catalog::builtin().unwrap().get(id).unwrap().clone()
    }

    fn kitchen() -> Kitchen<NullProgression> {
        let mut kitchen = Kitchen::new(NullProgression);
        kitchen.go_to_recipe_select();
        kitchen
    }

    #[test]
    fn test_start_opens_session() {
        let mut kitchen = kitchen();
        let eggs = recipe("scrambled_eggs");
        kitchen.start_recipe(&eggs).unwrap();

        assert_eq!(kitchen.game().phase(), GamePhase::MiniGame);
        let session = kitchen.session().unwrap();
        assert_eq!(Some(session.kind()), eggs.steps[0].mini_game_kind());
    }

    #[test]
    fn test_idle_play_times_out_every_step() {
        let mut kitchen = kitchen();
        let mut eggs = recipe("scrambled_eggs");
        for step in &mut eggs.steps {
            step.mini_game = step.mini_game.map(|m| m.with_time_limit(2.0));
        }
        kitchen.start_recipe(&eggs).unwrap();

        for _ in 0..(60 * 2 * eggs.steps.len() + 30) {
            kitchen.tick(DT);
        }

        assert_eq!(kitchen.game().phase(), GamePhase::RecipeComplete);
        assert!(kitchen.session().is_none());
        let report = kitchen.last_report().unwrap();
        assert_eq!(report.step_scores.len(), eggs.steps.len());
        assert_eq!(report.step_scores.iter().sum::<u32>(), report.completion.total_score);
        assert!(report.step_scores.iter().all(|&s| s <= 100));
    }

    #[test]
    fn test_cancel_discards_without_advancing() {
        let mut kitchen = kitchen();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        kitchen.events_mut().subscribe(move |e: &GameEvent| sink.borrow_mut().push(e.clone()));

        kitchen.start_recipe(&recipe("pancakes")).unwrap();
        kitchen.tick(DT);
        kitchen.cancel_mini_game().unwrap();

        assert_eq!(kitchen.game().phase(), GamePhase::RecipeSelect);
        assert!(kitchen.session().is_none());
        let events = log.borrow();
        assert!(events.iter().any(|e| matches!(e, GameEvent::MiniGameCancelled { step_index: 0, .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::StepCompleted { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::MiniGameFinished { .. })));

        assert!(kitchen.cancel_mini_game().is_err());
    }

    #[test]
    fn test_pause_freezes_session() {
        let mut kitchen = kitchen();
        kitchen.start_recipe(&recipe("pancakes")).unwrap();
        kitchen.tick(DT);
        let before = kitchen.readout().unwrap().time_remaining;

        assert!(kitchen.toggle_pause());
        assert!(kitchen.session().unwrap().is_paused());
        for _ in 0..120 {
            kitchen.tick(DT);
        }
        assert_eq!(kitchen.readout().unwrap().time_remaining, before);

        assert!(!kitchen.toggle_pause());
        kitchen.tick(DT);
        assert!(kitchen.readout().unwrap().time_remaining < before);
    }

    #[test]
    fn test_pass_through_auto_advance() {
        let mut kitchen = kitchen();
        let mut soup = recipe("tomato_soup");
        soup.steps[0].mini_game = None;
        soup.steps[0].duration = 1.0;
        kitchen.start_recipe(&soup).unwrap();
        assert_eq!(kitchen.game().phase(), GamePhase::Cooking);
        assert!(kitchen.session().is_none());

        for _ in 0..61 {
            kitchen.tick(DT);
        }
        assert_eq!(kitchen.game().current_step_index(), 1);
        assert_eq!(kitchen.game().phase(), GamePhase::MiniGame);
        assert!(kitchen.session().is_some());
        assert_eq!(kitchen.game().total_score(), 100);
    }

    #[test]
    fn test_zero_length_pass_through_advances() {
        let mut kitchen = kitchen();
        let mut soup = recipe("tomato_soup");
        soup.steps[0].mini_game = None;
        soup.steps[0].duration = 0.0;
        assert!(soup.validate().is_ok());
        kitchen.start_recipe(&soup).unwrap();
        assert_eq!(kitchen.game().phase(), GamePhase::Cooking);

        kitchen.tick(DT);
        assert_eq!(kitchen.game().current_step_index(), 1);
        assert_eq!(kitchen.game().total_score(), 100);
    }

    #[test]
    fn test_relay_readout_into_orchestrator() {
        let mut kitchen = kitchen();
        let mut pancakes = recipe("pancakes");
        pancakes.steps[0].mini_game = Some(MiniGameConfig::new(MiniGameKind::HeatControl, 3));
        kitchen.start_recipe(&pancakes).unwrap();

        kitchen.handle_input(&MiniGameInput::KeyDown(Key::Up));
        for _ in 0..60 {
            kitchen.tick(DT);
        }
        assert!(kitchen.game().temperature() > 0.0);
        assert_eq!(
            Some(kitchen.game().temperature()),
            kitchen.readout().and_then(|r| r.temperature)
        );
    }

    #[test]
    fn test_reset_from_mini_game() {
        let mut kitchen = kitchen();
        kitchen.start_recipe(&recipe("pancakes")).unwrap();
        kitchen.reset_game();
        assert_eq!(kitchen.game(), &CookingGame::new());
        assert!(kitchen.session().is_none());
        assert!(kitchen.start_recipe(&recipe("pancakes")).is_err());
    }
}
