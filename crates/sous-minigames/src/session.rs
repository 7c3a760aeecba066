//! Mini-Game Session
//!
//! Wraps one live mini-game from its first tick to a single completion.
//! The session owns the time limit and the pause flag; the game only knows
//! how to react to input, integrate a frame and report its current score.

use serde::Serialize;
use sous_core::{Countdown, DVec2, DeltaTime, FeedbackSink};

use crate::games;
use crate::input::MiniGameInput;
use crate::scoring::ScoreBreakdown;
use crate::{MiniGameConfig, MiniGameKind, Score};

/// Transient values the presentation layer displays
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Readout {
    /// Objective completion, 0 to 1
    pub progress: f64,
    pub time_remaining: f64,
    pub combo: u32,
    /// Pan temperature (heat control)
    pub temperature: Option<f64>,
    /// Mixing progress 0 to 100 (stirring)
    pub mixing_progress: Option<f64>,
    /// Points earned by cuts so far (chopping)
    pub chopping_points: Option<u32>,
    /// Where the player should aim next, in game space
    pub cue: Option<DVec2>,
    /// Where the player's tool currently is, in game space
    pub tool: Option<DVec2>,
    /// Short status for the HUD
    pub status: &'static str,
}

/// Behaviour of one mini-game type
pub trait MiniGame {
    /// Mini-game type
    fn kind(&self) -> MiniGameKind;

    /// React to one input event
    fn handle_input(&mut self, input: &MiniGameInput, fx: &mut dyn FeedbackSink);

    /// Integrate one simulation tick
    fn update(&mut self, dt: DeltaTime, fx: &mut dyn FeedbackSink);

    /// True once the objective is reached
    fn is_complete(&self) -> bool;

    /// True when there is nothing to do (e.g. zero target cuts)
    fn is_trivial(&self) -> bool {
        false
    }

    /// Score for the current state; partial before completion
    fn breakdown(&self) -> ScoreBreakdown;

    /// Values for display
    fn readout(&self) -> Readout;
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOutcome {
    pub kind: MiniGameKind,
    pub score: Score,
    pub breakdown: ScoreBreakdown,
    /// Ended by the time limit instead of the objective
    pub timed_out: bool,
    /// Simulation seconds the session ran
    pub elapsed: f64,
    /// Score reached the configured target
    pub passed: bool,
}

type CompletionCallback = Box<dyn FnOnce(&SessionOutcome)>;

/// One live mini-game
pub struct MiniGameSession {
    config: MiniGameConfig,
    game: Box<dyn MiniGame>,
    time_limit: Countdown,
    paused: bool,
    outcome: Option<SessionOutcome>,
    on_complete: Option<CompletionCallback>,
}

impl MiniGameSession {
    /// Wrap an existing game
    pub fn new(config: MiniGameConfig, game: Box<dyn MiniGame>) -> Self {
        log::debug!(
            "Starting {} session (difficulty {}, {:.0}s limit)",
            config.kind,
            config.difficulty,
            config.time_limit
        );
        Self {
            time_limit: Countdown::new(config.time_limit),
            config,
            game,
            paused: false,
            outcome: None,
            on_complete: None,
        }
    }

    /// Build the game a binding describes
    pub fn from_config(config: &MiniGameConfig) -> Self {
        Self::new(*config, games::build(config))
    }

    /// Register the completion callback; it runs at most once
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&SessionOutcome) + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &MiniGameConfig {
        &self.config
    }

    pub fn kind(&self) -> MiniGameKind {
        self.config.kind
    }

    /// Forward input to the game. Ignored while paused or after completion.
    pub fn handle_input(&mut self, input: &MiniGameInput, fx: &mut dyn FeedbackSink) {
        if self.paused || self.outcome.is_some() {
            return;
        }
        self.game.handle_input(input, fx);
    }

    /// Advance one tick. Returns the score on the tick the session completes
    /// and `None` on every other tick.
    pub fn tick(&mut self, dt: DeltaTime, fx: &mut dyn FeedbackSink) -> Option<Score> {
        if self.outcome.is_some() || self.paused {
            return None;
        }
        if self.game.is_trivial() {
            return Some(self.finish(ScoreBreakdown::flat("trivial", Score::MAX), false));
        }

        self.game.update(dt, fx);
        let expired = self.time_limit.tick(dt);

        if self.game.is_complete() {
            Some(self.finish(self.game.breakdown(), false))
        } else if expired {
            log::info!("{} session timed out, force-completing", self.config.kind);
            Some(self.finish(self.game.breakdown(), true))
        } else {
            None
        }
    }

    fn finish(&mut self, breakdown: ScoreBreakdown, timed_out: bool) -> Score {
        let score = breakdown.total;
        let outcome = SessionOutcome {
            kind: self.config.kind,
            score,
            breakdown,
            timed_out,
            elapsed: self.time_limit.elapsed(),
            passed: score.value() >= self.config.target_score,
        };
        log::info!("{} complete: {}", self.config.kind, outcome.breakdown);
        if let Some(callback) = self.on_complete.take() {
            callback(&outcome);
        }
        self.outcome = Some(outcome);
        score
    }

    /// Discard the session without completing it
    pub fn cancel(self) {
        if self.outcome.is_none() {
            log::debug!("{} session cancelled", self.config.kind);
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    /// The final result, once completed
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// Seconds left before the session force-completes
    pub fn time_remaining(&self) -> f64 {
        self.time_limit.remaining()
    }

    /// Score if the session ended now
    pub fn current_breakdown(&self) -> ScoreBreakdown {
        self.game.breakdown()
    }

    /// Display values with the session's time remaining filled in
    pub fn readout(&self) -> Readout {
        Readout {
            time_remaining: self.time_limit.remaining(),
            ..self.game.readout()
        }
    }
}

impl std::fmt::Debug for MiniGameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniGameSession")
            .field("config", &self.config)
            .field("time_remaining", &self.time_limit.remaining())
            .field("paused", &self.paused)
            .field("outcome", &self.outcome)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chopping::{ChoppingGame, ChoppingParams};
    use crate::input::Key;
    use sous_core::NullFeedback;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: DeltaTime = DeltaTime(1.0 / 60.0);

    fn run_until_done(session: &mut MiniGameSession, max_ticks: usize) -> Option<(usize, Score)> {
        let mut fx = NullFeedback;
        (0..max_ticks).find_map(|i| session.tick(DT, &mut fx).map(|s| (i, s)))
    }

    #[test]
    fn test_empty_objective_completes_immediately() {
        let config = MiniGameConfig::new(MiniGameKind::Chopping, 1);
        let game = ChoppingGame::new(ChoppingParams { target_cuts: 0, ..Default::default() });
        let mut session = MiniGameSession::new(config, Box::new(game));

        let mut fx = NullFeedback;
        assert_eq!(session.tick(DT, &mut fx), Some(Score::MAX));
        assert!(session.is_completed());
    }

    #[test]
    fn test_paused_empty_objective_waits() {
        let config = MiniGameConfig::new(MiniGameKind::Chopping, 1);
        let game = ChoppingGame::new(ChoppingParams { target_cuts: 0, ..Default::default() });
        let mut session = MiniGameSession::new(config, Box::new(game));
        session.pause();

        let mut fx = NullFeedback;
        assert_eq!(session.tick(DT, &mut fx), None);
        assert!(!session.is_completed());

        session.resume();
        assert_eq!(session.tick(DT, &mut fx), Some(Score::MAX));
    }

    /// Hostile input for every game: non-finite and huge pointer values,
    /// spammed action keys and zero, normal and oversized frame times
    fn hostile_inputs() -> Vec<MiniGameInput> {
        let mut inputs = vec![
            MiniGameInput::pointer(f64::NAN, f64::NAN),
            MiniGameInput::pointer(f64::INFINITY, f64::NEG_INFINITY),
            MiniGameInput::pointer(-1e12, 1e12),
            MiniGameInput::PointerDrag { dx: 1e9, dy: -1e9 },
            MiniGameInput::PointerDrag { dx: f64::NAN, dy: f64::INFINITY },
            MiniGameInput::PointerDown,
            MiniGameInput::pointer(0.0, 1.0),
        ];
        for i in 0..40 {
            inputs.push(MiniGameInput::KeyDown(if i % 2 == 0 { Key::Space } else { Key::Enter }));
            inputs.push(MiniGameInput::KeyDown(Key::Up));
            inputs.push(MiniGameInput::PointerDown);
            inputs.push(MiniGameInput::PointerUp);
        }
        inputs
    }

    #[test]
    fn test_hostile_input_keeps_score_in_range() {
        let frame_times = [DeltaTime(0.0), DT, DeltaTime(0.0), DeltaTime(0.25)];
        for kind in MiniGameKind::ALL {
            for difficulty in 1..=5 {
                let config = MiniGameConfig::new(kind, difficulty);
                let mut session = MiniGameSession::from_config(&config);
                let mut fx = NullFeedback;
                let mut scores = Vec::new();

                for (i, input) in hostile_inputs().iter().enumerate() {
                    session.handle_input(input, &mut fx);
                    scores.extend(session.tick(frame_times[i % frame_times.len()], &mut fx));
                }
                scores.extend(session.tick(DeltaTime(1e9), &mut fx));
                for _ in 0..10 {
                    scores.extend(session.tick(DeltaTime(1e9), &mut fx));
                    scores.extend(session.tick(DT, &mut fx));
                }

                assert_eq!(scores.len(), 1, "{kind} d{difficulty}: {scores:?}");
                assert!(scores[0] <= Score::MAX, "{kind} d{difficulty}: {}", scores[0]);
                let outcome = session.outcome().unwrap();
                assert_eq!(outcome.score, scores[0]);
                assert!(outcome.breakdown.total <= Score::MAX);
            }
        }
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let config = MiniGameConfig::new(MiniGameKind::Stirring, 1).with_time_limit(1.0);
        let mut session = MiniGameSession::from_config(&config)
            .on_complete(move |outcome| sink.borrow_mut().push(outcome.score));

        let mut fx = NullFeedback;
        let mut completions = 0;
        for _ in 0..240 {
            if session.tick(DT, &mut fx).is_some() {
                completions += 1;
            }
        }

        assert_eq!(completions, 1);
        assert_eq!(calls.borrow().len(), 1);
        assert!(session.outcome().is_some_and(|o| o.timed_out));
    }

    #[test]
    fn test_timeout_with_no_input() {
        let config = MiniGameConfig::new(MiniGameKind::Stirring, 3).with_time_limit(60.0);
        let mut session = MiniGameSession::from_config(&config);

        let (tick, score) = run_until_done(&mut session, 4000).unwrap();
        let elapsed = (tick + 1) as f64 * DT.as_secs();
        assert!((elapsed - 60.0).abs() <= DT.as_secs() + 1e-9);
        assert_eq!(score, Score::ZERO);

        let outcome = session.outcome().unwrap();
        assert!(outcome.timed_out);
        assert!(!outcome.passed);
    }

    #[test]
    fn test_pause_freezes_time() {
        let config = MiniGameConfig::new(MiniGameKind::HeatControl, 2).with_time_limit(1.0);
        let mut session = MiniGameSession::from_config(&config);
        let mut fx = NullFeedback;

        session.pause();
        for _ in 0..600 {
            assert_eq!(session.tick(DT, &mut fx), None);
        }
        assert_eq!(session.time_remaining(), 1.0);

        session.resume();
        assert!(run_until_done(&mut session, 120).is_some());
    }

    #[test]
    fn test_input_ignored_while_paused() {
        let config = MiniGameConfig::new(MiniGameKind::Chopping, 1);
        let mut session = MiniGameSession::from_config(&config);
        let mut fx = NullFeedback;

        session.toggle_pause();
        session.handle_input(&MiniGameInput::KeyDown(Key::Space), &mut fx);
        session.toggle_pause();
        session.tick(DT, &mut fx);

        assert_eq!(session.readout().chopping_points, Some(0));
    }

    #[test]
    fn test_cancel_does_not_fire() {
        let fired = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&fired);
        let config = MiniGameConfig::new(MiniGameKind::Plating, 2);
        let mut session = MiniGameSession::from_config(&config).on_complete(move |_| *flag.borrow_mut() = true);

        let mut fx = NullFeedback;
        session.tick(DT, &mut fx);
        session.cancel();

        assert!(!*fired.borrow());
    }

    #[test]
    fn test_readout_reports_time_remaining() {
        let config = MiniGameConfig::new(MiniGameKind::Measuring, 2).with_time_limit(10.0);
        let mut session = MiniGameSession::from_config(&config);
        let mut fx = NullFeedback;
        for _ in 0..60 {
            session.tick(DT, &mut fx);
        }
        assert!((session.readout().time_remaining - 9.0).abs() < 1e-6);
    }
}
