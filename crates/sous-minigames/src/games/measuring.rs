//! Measuring
//!
//! Tilt a container to pour an ingredient into a measuring cup, then confirm
//! the pour. Thick ingredients flow slowly; close to the line the pour slows
//! down further so the player can stop on the mark.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use sous_core::math::SmoothDamp;
use sous_core::{DVec2, DeltaTime, Feedback, FeedbackSink, ParticleKind, SoundCue};

use crate::input::MiniGameInput;
use crate::scoring::measuring::{MEASURING_TIERS, PourResult, pour_accuracy, pour_tier, score_measuring};
use crate::scoring::{ComboTracker, ScoreBreakdown, Tier};
use crate::session::{MiniGame, Readout};
use crate::MiniGameKind;

/// Cup fractions a pour may target
pub const TARGET_FRACTIONS: [f64; 5] = [0.25, 0.33, 0.5, 0.75, 1.0];

/// Pourable ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ingredient {
    Water,
    Milk,
    Oil,
    Flour,
    Sugar,
    Honey,
}

impl Ingredient {
    pub const ALL: [Ingredient; 6] = [
        Self::Water,
        Self::Milk,
        Self::Oil,
        Self::Flour,
        Self::Sugar,
        Self::Honey,
    ];

    /// Relative flow speed
    pub fn flow(&self) -> f64 {
        match self {
            Self::Water => 1.0,
            Self::Milk => 0.9,
            Self::Oil => 0.7,
            Self::Flour => 0.5,
            Self::Sugar => 0.6,
            Self::Honey => 0.3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Water => "Water",
            Self::Milk => "Milk",
            Self::Oil => "Oil",
            Self::Flour => "Flour",
            Self::Sugar => "Sugar",
            Self::Honey => "Honey",
        }
    }
}

/// One planned pour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedPour {
    pub ingredient: Ingredient,
    pub target: f64,
}

/// Measuring tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuringParams {
    pub pours: u32,
    /// Seeds the ingredient and target sequence
    pub seed: u32,
    /// Tilt (radians) below which nothing pours
    pub pour_threshold: f64,
    pub max_tilt: f64,
    pub flow_scale: f64,
    /// Distance from the target where the pour slows down
    pub slow_zone: f64,
    pub slow_factor: f64,
    /// Most a cup can hold, as a fraction of one cup
    pub overflow_cap: f64,
    /// Tilt change per arrow-key press
    pub key_step: f64,
    pub smooth_time: f64,
}

impl Default for MeasuringParams {
    fn default() -> Self {
        Self {
            pours: 4,
            seed: 0,
            pour_threshold: 0.3,
            max_tilt: FRAC_PI_2,
            flow_scale: 0.5,
            slow_zone: 0.1,
            slow_factor: 0.3,
            overflow_cap: 1.2,
            key_step: 0.05,
            smooth_time: 0.05,
        }
    }
}

impl MeasuringParams {
    pub fn for_difficulty(difficulty: u8) -> Self {
        let d = difficulty.clamp(1, 5) as u32;
        Self {
            pours: 3 + d / 2,
            seed: d,
            ..Self::default()
        }
    }

    /// Ingredient and target for every pour
    pub fn plan(&self) -> Vec<PlannedPour> {
        (0..self.pours as usize)
            .map(|i| {
                let s = self.seed as usize;
                PlannedPour {
                    ingredient: Ingredient::ALL[(i + s) % Ingredient::ALL.len()],
                    target: TARGET_FRACTIONS[(i * 2 + s) % TARGET_FRACTIONS.len()],
                }
            })
            .collect()
    }
}

/// Live measuring state
#[derive(Debug, Clone)]
pub struct MeasuringGame {
    params: MeasuringParams,
    plan: Vec<PlannedPour>,
    tilt_target: f64,
    tilt: SmoothDamp,
    amount: f64,
    pointer_held: bool,
    results: Vec<PourResult>,
    tracker: ComboTracker,
}

impl MeasuringGame {
    pub fn new(params: MeasuringParams) -> Self {
        Self {
            plan: params.plan(),
            tilt_target: 0.0,
            tilt: SmoothDamp::new(0.0, params.smooth_time),
            amount: 0.0,
            pointer_held: false,
            results: Vec::new(),
            tracker: ComboTracker::new(MEASURING_TIERS),
            params,
        }
    }

    /// Pour in progress, if any remain
    pub fn current(&self) -> Option<&PlannedPour> {
        self.plan.get(self.results.len())
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn tilt(&self) -> f64 {
        self.tilt.value
    }

    pub fn results(&self) -> &[PourResult] {
        &self.results
    }

    pub fn is_pouring(&self) -> bool {
        self.tilt.value > self.params.pour_threshold
    }

    fn set_tilt(&mut self, tilt: f64) {
        if tilt.is_nan() {
            return;
        }
        self.tilt_target = tilt.clamp(0.0, self.params.max_tilt);
    }

    fn confirm(&mut self, fx: &mut dyn FeedbackSink) {
        let Some(pour) = self.current().copied() else {
            return;
        };
        let accuracy = pour_accuracy(pour.target, self.amount);
        let graded = self.tracker.grade(pour_tier(accuracy));
        log::debug!(
            "Pour {} ({}): {:.3} of {:.2} -> {:.0}% {:?}",
            self.results.len() + 1,
            pour.ingredient.name(),
            self.amount,
            pour.target,
            accuracy,
            graded.tier
        );
        self.results.push(PourResult {
            target: pour.target,
            actual: self.amount,
            accuracy,
            tier: graded.tier,
            points: graded.points,
        });

        if graded.tier >= Tier::Great {
            fx.emit(Feedback::Sound(SoundCue::Success));
            fx.emit(Feedback::ParticleBurst {
                kind: ParticleKind::Sparkle,
                at: DVec2::new(0.0, self.amount),
                count: 10,
            });
        }

        self.amount = 0.0;
        self.tilt_target = 0.0;
        self.tilt.snap(0.0);
    }
}

impl MiniGame for MeasuringGame {
    fn kind(&self) -> MiniGameKind {
        MiniGameKind::Measuring
    }

    fn handle_input(&mut self, input: &MiniGameInput, fx: &mut dyn FeedbackSink) {
        match *input {
            MiniGameInput::PointerDown => self.pointer_held = true,
            MiniGameInput::PointerUp => self.pointer_held = false,
            MiniGameInput::PointerMove { y, .. } if self.pointer_held => {
                self.set_tilt(y.max(0.0) * self.params.max_tilt)
            }
            MiniGameInput::PointerDrag { dy, .. } => {
                self.set_tilt(self.tilt_target + dy * self.params.max_tilt)
            }
            MiniGameInput::KeyDown(key) if key.is_action() => self.confirm(fx),
            MiniGameInput::KeyDown(key) => {
                self.set_tilt(self.tilt_target + key.axis() * self.params.key_step)
            }
            _ => {}
        }
    }

    fn update(&mut self, dt: DeltaTime, fx: &mut dyn FeedbackSink) {
        let secs = dt.as_secs();
        let Some(pour) = self.current().copied() else {
            return;
        };
        let was_pouring = self.is_pouring();
        let tilt = self.tilt.update(self.tilt_target, secs);
        if tilt <= self.params.pour_threshold {
            return;
        }

        let near_line = (self.amount - pour.target).abs() < self.params.slow_zone;
        let slow = if near_line { self.params.slow_factor } else { 1.0 };
        let rate = (tilt - self.params.pour_threshold) * pour.ingredient.flow() * slow;
        self.amount = (self.amount + rate * secs * self.params.flow_scale).min(self.params.overflow_cap);

        if !was_pouring {
            fx.emit(Feedback::Sound(SoundCue::Pour));
        }
    }

    fn is_complete(&self) -> bool {
        self.results.len() >= self.plan.len()
    }

    fn is_trivial(&self) -> bool {
        self.plan.is_empty()
    }

    fn breakdown(&self) -> ScoreBreakdown {
        score_measuring(&self.results, self.plan.len(), self.tracker.combo())
    }

    fn readout(&self) -> Readout {
        let planned = self.plan.len().max(1) as f64;
        Readout {
            progress: (self.results.len() as f64 / planned).min(1.0),
            combo: self.tracker.combo(),
            cue: self.current().map(|p| DVec2::new(p.target, 0.0)),
            tool: Some(DVec2::new(self.amount, self.tilt.value)),
            status: match self.results.last() {
                _ if self.is_pouring() => "Pouring...",
                Some(r) => r.tier.label(),
                None => "Tilt to pour",
            },
            ..Readout::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::Score;
    use sous_core::NullFeedback;

    const DT: DeltaTime = DeltaTime(1.0 / 60.0);

    /// Pour until within `tolerance` of the line, then stop and confirm
    fn measure(game: &mut MeasuringGame, tolerance: f64) {
        let mut fx = NullFeedback;
        let Some(target) = game.current().map(|p| p.target) else {
            return;
        };
        game.handle_input(&MiniGameInput::PointerDrag { dx: 0.0, dy: 0.5 }, &mut fx);
        for _ in 0..10_000 {
            if game.amount() >= target - tolerance {
                break;
            }
            game.update(DT, &mut fx);
        }
        game.handle_input(&MiniGameInput::KeyDown(Key::Space), &mut fx);
    }

    #[test]
    fn test_nan_tilt_is_ignored() {
        let mut game = MeasuringGame::new(MeasuringParams::default());
        let mut fx = NullFeedback;
        game.handle_input(&MiniGameInput::PointerDrag { dx: 0.0, dy: f64::NAN }, &mut fx);
        game.handle_input(&MiniGameInput::PointerDown, &mut fx);
        game.handle_input(&MiniGameInput::pointer(0.0, f64::NAN), &mut fx);
        for _ in 0..30 {
            game.update(DT, &mut fx);
        }
        assert!(game.tilt().is_finite());
        assert!(game.amount().is_finite());

        measure(&mut game, 0.005);
        assert_eq!(game.results().len(), 1);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let params = MeasuringParams::for_difficulty(3);
        assert_eq!(params.pours, 4);
        assert_eq!(params.plan(), params.plan());
        assert!(params.plan().iter().all(|p| TARGET_FRACTIONS.contains(&p.target)));
    }

    #[test]
    fn test_careful_pours_score_high() {
        let mut game = MeasuringGame::new(MeasuringParams::default());
        for _ in 0..4 {
            measure(&mut game, 0.005);
        }

        assert!(game.is_complete());
        assert!(game.results().iter().all(|r| r.tier == Tier::Perfect));
        // 0.6 * ~99 + 20 + 8
        assert!(game.breakdown().total.value() >= 85);
    }

    #[test]
    fn test_nothing_pours_below_threshold() {
        let mut game = MeasuringGame::new(MeasuringParams::default());
        let mut fx = NullFeedback;
        game.handle_input(&MiniGameInput::KeyDown(Key::Up), &mut fx);
        for _ in 0..300 {
            game.update(DT, &mut fx);
        }
        assert_eq!(game.amount(), 0.0);
    }

    #[test]
    fn test_overflow_is_capped() {
        let mut game = MeasuringGame::new(MeasuringParams::default());
        let mut fx = NullFeedback;
        game.handle_input(&MiniGameInput::PointerDrag { dx: 0.0, dy: 1.0 }, &mut fx);
        for _ in 0..10_000 {
            game.update(DT, &mut fx);
        }
        assert_eq!(game.amount(), 1.2);
    }

    #[test]
    fn test_confirm_resets_pour() {
        let mut game = MeasuringGame::new(MeasuringParams::default());
        measure(&mut game, 0.2);
        assert_eq!(game.results().len(), 1);
        assert_eq!(game.amount(), 0.0);
        assert_eq!(game.tilt(), 0.0);
        assert!(!game.is_complete());
    }

    #[test]
    fn test_empty_confirmations_score_low() {
        let mut game = MeasuringGame::new(MeasuringParams::default());
        let mut fx = NullFeedback;
        for _ in 0..4 {
            game.handle_input(&MiniGameInput::KeyDown(Key::Enter), &mut fx);
        }
        assert!(game.is_complete());
        // every target is at least a quarter cup, so empty cups score poorly
        assert!(game.breakdown().total.value() <= 40);
    }

    #[test]
    fn test_zero_pours_is_trivial() {
        let game = MeasuringGame::new(MeasuringParams { pours: 0, ..Default::default() });
        assert!(game.is_trivial());
        assert_eq!(game.breakdown().total, Score::MAX);
    }
}
