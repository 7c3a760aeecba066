//! Stirring
//!
//! The spoon follows the pointer inside the bowl. Its angular speed around
//! the bowl centre decides whether the mixture makes progress.

use sous_core::math::{SmoothDamp2, wrap_angle};
use sous_core::{DVec2, DeltaTime, Feedback, FeedbackSink, ParticleKind, SoundCue};

use crate::input::MiniGameInput;
use crate::scoring::stirring::{SpeedBand, StirTally, StirringParams, score_stirring};
use crate::scoring::ScoreBreakdown;
use crate::session::{MiniGame, Readout};
use crate::MiniGameKind;

/// Inner radius of the bowl in world units
pub const BOWL_RADIUS: f64 = 0.15;
/// Spoon smoothing time in seconds
pub const SPOON_SMOOTH_TIME: f64 = 0.05;
/// Below this distance from the centre the spoon has no meaningful angle
const CENTRE_DEAD_ZONE: f64 = 1e-3;
/// Seconds between splash effects
const SPLASH_INTERVAL: f64 = 0.25;

/// Live stirring state
#[derive(Debug, Clone)]
pub struct StirringGame {
    params: StirringParams,
    spoon: SmoothDamp2,
    spoon_target: DVec2,
    last_angle: Option<f64>,
    speed: f64,
    band: SpeedBand,
    tally: StirTally,
    splash_cooldown: f64,
}

impl StirringGame {
    pub fn new(params: StirringParams) -> Self {
        Self {
            params,
            spoon: SmoothDamp2::new(DVec2::ZERO, SPOON_SMOOTH_TIME),
            spoon_target: DVec2::ZERO,
            last_angle: None,
            speed: 0.0,
            band: SpeedBand::TooSlow,
            tally: StirTally::default(),
            splash_cooldown: 0.0,
        }
    }

    /// Angular speed of the spoon in rad/s
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn band(&self) -> SpeedBand {
        self.band
    }

    pub fn tally(&self) -> &StirTally {
        &self.tally
    }

    fn aim(&mut self, pointer: DVec2) {
        if !pointer.is_finite() {
            return;
        }
        self.spoon_target = pointer.clamp_length_max(1.0) * BOWL_RADIUS;
    }

    fn splash(&mut self, at: DVec2, fx: &mut dyn FeedbackSink) {
        if self.splash_cooldown > 0.0 {
            return;
        }
        self.splash_cooldown = SPLASH_INTERVAL;
        fx.emit(Feedback::ParticleBurst {
            kind: ParticleKind::Splash,
            at,
            count: 6,
        });
        fx.emit(Feedback::CameraShake {
            intensity: 0.01,
            duration: 0.15,
        });
    }
}

impl MiniGame for StirringGame {
    fn kind(&self) -> MiniGameKind {
        MiniGameKind::Stirring
    }

    fn handle_input(&mut self, input: &MiniGameInput, _fx: &mut dyn FeedbackSink) {
        match *input {
            MiniGameInput::PointerMove { x, y } => self.aim(DVec2::new(x, y)),
            MiniGameInput::PointerDrag { dx, dy } => {
                let pointer = self.spoon_target / BOWL_RADIUS + DVec2::new(dx, dy);
                self.aim(pointer);
            }
            _ => {}
        }
    }

    fn update(&mut self, dt: DeltaTime, fx: &mut dyn FeedbackSink) {
        let dt = dt.as_secs();
        if dt <= 0.0 {
            return;
        }
        self.splash_cooldown = (self.splash_cooldown - dt).max(0.0);

        let position = self.spoon.update(self.spoon_target, dt);
        let radius = position.length();
        if radius < CENTRE_DEAD_ZONE {
            self.last_angle = None;
            self.speed = 0.0;
        } else {
            let angle = position.y.atan2(position.x);
            self.speed = self
                .last_angle
                .map_or(0.0, |last| wrap_angle(angle - last).abs() / dt);
            self.last_angle = Some(angle);
        }

        let previous_band = self.band;
        self.band = self.params.band(self.speed);
        match self.band {
            SpeedBand::SweetSpot => {
                let target = self.params.target_progress;
                let gain = self.params.progress_rate(self.tally.progress) * dt;
                self.tally.progress = (self.tally.progress + gain).min(target);
                self.tally.rhythm = (self.tally.rhythm + self.params.rhythm_rate * dt).min(self.params.rhythm_cap);
                self.tally.radius.push(radius);
            }
            SpeedBand::TooFast => {
                if self.params.in_closing_window(self.tally.progress) && !self.tally.too_fast_near_end {
                    log::debug!("Stirring too fast near the end at {:.1} rad/s", self.speed);
                    self.tally.too_fast_near_end = true;
                }
                self.splash(position, fx);
            }
            SpeedBand::TooSlow => {}
        }

        if previous_band != SpeedBand::SweetSpot && self.band == SpeedBand::SweetSpot {
            fx.emit(Feedback::Sound(SoundCue::Pour));
        }
    }

    fn is_complete(&self) -> bool {
        self.tally.progress >= self.params.target_progress
    }

    fn breakdown(&self) -> ScoreBreakdown {
        score_stirring(&self.tally, &self.params)
    }

    fn readout(&self) -> Readout {
        let target = self.params.target_progress.max(f64::EPSILON);
        let fraction = (self.tally.progress / target).clamp(0.0, 1.0);
        Readout {
            progress: fraction,
            mixing_progress: Some(fraction * 100.0),
            tool: Some(self.spoon.value()),
            status: match self.band {
                SpeedBand::TooSlow => "Stir faster",
                SpeedBand::SweetSpot => "Perfect pace",
                SpeedBand::TooFast => "Too fast!",
            },
            ..Readout::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Score;
    use sous_core::{FeedbackLog, NullFeedback};
    use std::f64::consts::TAU;

    const DT: DeltaTime = DeltaTime(1.0 / 60.0);

    /// Circle the pointer at `rate` rad/s for `seconds`, starting from `angle`
    fn stir(game: &mut StirringGame, mut angle: f64, rate: f64, seconds: f64, fx: &mut dyn FeedbackSink) -> f64 {
        let frames = (seconds / DT.as_secs()) as usize;
        for _ in 0..frames {
            angle += rate * DT.as_secs();
            game.handle_input(&MiniGameInput::pointer(0.7 * angle.cos(), 0.7 * angle.sin()), fx);
            game.update(DT, fx);
            if game.is_complete() {
                break;
            }
        }
        angle
    }

    #[test]
    fn test_steady_stirring_completes_with_full_score() {
        let mut game = StirringGame::new(StirringParams::default());
        let mut fx = NullFeedback;
        stir(&mut game, 0.0, TAU * 0.6, 30.0, &mut fx);

        assert!(game.is_complete());
        assert!(!game.tally().too_fast_near_end);
        let score = game.breakdown();
        assert!(score.total.value() >= 90, "{score}");
    }

    #[test]
    fn test_idle_spoon_makes_no_progress() {
        let mut game = StirringGame::new(StirringParams::default());
        let mut fx = NullFeedback;
        for _ in 0..600 {
            game.update(DT, &mut fx);
        }
        assert_eq!(game.tally().progress, 0.0);
        assert_eq!(game.breakdown().total, Score::ZERO);
    }

    #[test]
    fn test_too_fast_only_penalised_near_end() {
        let mut game = StirringGame::new(StirringParams::default());
        let mut fx = FeedbackLog::new();

        // Early thrashing splashes but is not penalised
        stir(&mut game, 0.0, 12.0, 1.0, &mut fx);
        assert_eq!(game.band(), SpeedBand::TooFast);
        assert!(!game.tally().too_fast_near_end);
        assert!(fx.bursts(ParticleKind::Splash) > 0);
        assert!(game.tally().progress < 5.0);

        // Stir properly into the closing window, then thrash
        let mut steady = StirringGame::new(StirringParams::default());
        let mut quiet = NullFeedback;
        let mut angle = 0.0;
        while steady.tally().progress < 85.0 {
            angle = stir(&mut steady, angle, 4.0, 0.1, &mut quiet);
        }
        stir(&mut steady, angle, 12.0, 0.5, &mut quiet);
        assert!(steady.tally().too_fast_near_end);
        assert_eq!(steady.breakdown().component("too_fast"), Some(-10.0));
    }

    #[test]
    fn test_non_finite_pointer_is_ignored() {
        let mut game = StirringGame::new(StirringParams::default());
        let mut fx = NullFeedback;
        for input in [
            MiniGameInput::pointer(f64::NAN, 0.5),
            MiniGameInput::pointer(f64::INFINITY, f64::NEG_INFINITY),
            MiniGameInput::PointerDrag { dx: f64::NAN, dy: f64::INFINITY },
        ] {
            game.handle_input(&input, &mut fx);
            game.update(DT, &mut fx);
        }
        assert!(game.speed().is_finite());

        stir(&mut game, 0.0, 4.0, 2.0, &mut fx);
        assert!(game.tally().progress > 0.0);
    }

    #[test]
    fn test_readout_mixing_progress() {
        let mut game = StirringGame::new(StirringParams::default());
        let mut fx = NullFeedback;
        stir(&mut game, 0.0, 4.0, 2.0, &mut fx);
        let readout = game.readout();
        let mixing = readout.mixing_progress.unwrap_or_default();
        assert!(mixing > 0.0 && mixing < 100.0);
        assert_eq!(readout.status, "Perfect pace");
    }
}
