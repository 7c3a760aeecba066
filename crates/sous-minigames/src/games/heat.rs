//! Heat control
//!
//! The knob sets a target temperature; the pan follows it with a lag. The
//! player has to keep the pan inside the band long enough without burning it.

use std::f64::consts::PI;

use sous_core::math::approach;
use sous_core::{Countdown, DVec2, DeltaTime, Feedback, FeedbackSink, ParticleKind, SoundCue};

use crate::input::MiniGameInput;
use crate::scoring::heat::{HeatParams, HeatTally, score_heat};
use crate::scoring::ScoreBreakdown;
use crate::session::{MiniGame, Readout};
use crate::MiniGameKind;

/// Knob change per arrow-key press (a tenth of a radian on a half-turn dial)
pub const KEY_STEP: f64 = 0.1 / PI;
/// Temperature above which the pan visibly smokes
pub const SMOKE_TEMPERATURE: f64 = 85.0;
/// Temperature above which the pan steams
pub const STEAM_TEMPERATURE: f64 = 40.0;
/// Seconds between ambient particle bursts
const PARTICLE_INTERVAL: f64 = 0.5;

/// Live heat-control state
#[derive(Debug, Clone)]
pub struct HeatGame {
    params: HeatParams,
    /// Knob level, 0 (off) to 1 (max)
    knob: f64,
    dragging: bool,
    tally: HeatTally,
    was_in_band: bool,
    particles: Countdown,
}

impl HeatGame {
    pub fn new(params: HeatParams) -> Self {
        Self {
            tally: HeatTally {
                temperature: params.initial_temperature,
                ..HeatTally::default()
            },
            params,
            knob: 0.0,
            dragging: false,
            was_in_band: false,
            particles: Countdown::repeating(PARTICLE_INTERVAL),
        }
    }

    /// Set the knob directly, 0 to 1
    pub fn set_knob(&mut self, level: f64) {
        self.knob = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
    }

    pub fn knob(&self) -> f64 {
        self.knob
    }

    /// Temperature the knob is asking for
    pub fn knob_temperature(&self) -> f64 {
        self.knob * 100.0
    }

    pub fn temperature(&self) -> f64 {
        self.tally.temperature
    }

    pub fn tally(&self) -> &HeatTally {
        &self.tally
    }

    pub fn params(&self) -> &HeatParams {
        &self.params
    }

    fn emit_ambient(&self, fx: &mut dyn FeedbackSink) {
        let t = self.tally.temperature;
        let kind = if t > SMOKE_TEMPERATURE {
            ParticleKind::Smoke
        } else if t > STEAM_TEMPERATURE {
            ParticleKind::Steam
        } else {
            return;
        };
        fx.emit(Feedback::ParticleBurst {
            kind,
            at: DVec2::ZERO,
            count: 3,
        });
    }
}

impl MiniGame for HeatGame {
    fn kind(&self) -> MiniGameKind {
        MiniGameKind::HeatControl
    }

    fn handle_input(&mut self, input: &MiniGameInput, _fx: &mut dyn FeedbackSink) {
        match *input {
            MiniGameInput::PointerDown => self.dragging = true,
            MiniGameInput::PointerUp => self.dragging = false,
            MiniGameInput::PointerMove { x, .. } if self.dragging => self.set_knob((x + 1.0) * 0.5),
            MiniGameInput::PointerDrag { dx, .. } => self.set_knob(self.knob + dx * 0.5),
            MiniGameInput::KeyDown(key) => self.set_knob(self.knob + key.axis() * KEY_STEP),
            _ => {}
        }
    }

    fn update(&mut self, dt: DeltaTime, fx: &mut dyn FeedbackSink) {
        let secs = dt.as_secs();
        if secs <= 0.0 {
            return;
        }
        self.tally.temperature = approach(
            self.tally.temperature,
            self.knob_temperature(),
            self.params.approach_rate,
            secs,
        );

        let in_band = self.params.in_band(self.tally.temperature);
        if in_band {
            self.tally.time_in_band += secs;
        }
        if self.params.in_danger(self.tally.temperature) {
            if self.tally.danger_time == 0.0 {
                log::debug!("Pan entered the danger zone at {:.1}", self.tally.temperature);
            }
            self.tally.danger_time += secs;
        }
        if in_band && !self.was_in_band {
            fx.emit(Feedback::Sound(SoundCue::Sizzle));
        }
        self.was_in_band = in_band;

        if self.particles.tick(dt) {
            self.emit_ambient(fx);
        }
    }

    fn is_complete(&self) -> bool {
        self.tally.time_in_band >= self.params.hold
    }

    fn breakdown(&self) -> ScoreBreakdown {
        score_heat(&self.tally, &self.params)
    }

    fn readout(&self) -> Readout {
        let t = self.tally.temperature;
        let status = if self.params.in_danger(t) {
            "Burning!"
        } else if t > self.params.band_max() {
            "Too hot"
        } else if self.params.in_band(t) {
            "In the zone"
        } else {
            "Too cold"
        };
        let hold = self.params.hold.max(f64::EPSILON);
        Readout {
            progress: (self.tally.time_in_band / hold).min(1.0),
            temperature: Some(t),
            cue: Some(DVec2::new(self.params.target / 100.0, 0.0)),
            tool: Some(DVec2::new(self.knob, 0.0)),
            status,
            ..Readout::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::Score;
    use sous_core::{FeedbackLog, NullFeedback};

    const DT: DeltaTime = DeltaTime(1.0 / 60.0);

    #[test]
    fn test_held_at_target_scores_max() {
        let params = HeatParams {
            target: 75.0,
            band: 12.0,
            hold: 15.0,
            initial_temperature: 75.0,
            ..Default::default()
        };
        let mut game = HeatGame::new(params);
        game.set_knob(0.75);
        let mut fx = NullFeedback;

        let mut ticks = 0;
        while !game.is_complete() && ticks < 2000 {
            game.update(DT, &mut fx);
            ticks += 1;
        }

        assert!(game.is_complete());
        assert!((ticks as f64 * DT.as_secs() - 15.0).abs() < 2.0 * DT.as_secs());
        assert_eq!(game.temperature(), 75.0);
        assert_eq!(game.tally().danger_time, 0.0);

        let score = game.breakdown();
        assert_eq!(score.component("accuracy"), Some(50.0));
        assert_eq!(score.component("burn"), Some(0.0));
        assert_eq!(score.total, Score::MAX);
    }

    #[test]
    fn test_temperature_lags_knob() {
        let mut game = HeatGame::new(HeatParams::default());
        game.set_knob(1.0);
        let mut fx = NullFeedback;

        game.update(DT, &mut fx);
        assert!(game.temperature() > 20.0 && game.temperature() < 100.0);

        for _ in 0..600 {
            game.update(DT, &mut fx);
        }
        assert!(game.temperature() > 99.0);
    }

    #[test]
    fn test_burning_accrues_penalty() {
        let params = HeatParams {
            initial_temperature: 100.0,
            ..Default::default()
        };
        let mut game = HeatGame::new(params);
        game.set_knob(1.0);
        let mut fx = FeedbackLog::new();
        for _ in 0..120 {
            game.update(DT, &mut fx);
        }

        assert!((game.tally().danger_time - 2.0).abs() < 0.05);
        assert!(fx.bursts(ParticleKind::Smoke) >= 3);
        assert_eq!(game.readout().status, "Burning!");
        assert!(game.breakdown().component("burn").unwrap_or(0.0) <= -9.0);
    }

    #[test]
    fn test_keyboard_and_drag() {
        let mut game = HeatGame::new(HeatParams::default());
        let mut fx = NullFeedback;

        game.handle_input(&MiniGameInput::KeyDown(Key::Up), &mut fx);
        assert!((game.knob() - KEY_STEP).abs() < 1e-12);
        game.handle_input(&MiniGameInput::KeyDown(Key::Down), &mut fx);
        game.handle_input(&MiniGameInput::KeyDown(Key::Down), &mut fx);
        assert_eq!(game.knob(), 0.0);

        // Moves only count while the knob is held
        game.handle_input(&MiniGameInput::pointer(0.5, 0.0), &mut fx);
        assert_eq!(game.knob(), 0.0);
        game.handle_input(&MiniGameInput::PointerDown, &mut fx);
        game.handle_input(&MiniGameInput::pointer(0.5, 0.0), &mut fx);
        assert_eq!(game.knob(), 0.75);
    }

    #[test]
    fn test_knob_is_clamped() {
        let mut game = HeatGame::new(HeatParams::default());
        game.set_knob(7.0);
        assert_eq!(game.knob(), 1.0);
        game.set_knob(f64::NAN);
        assert_eq!(game.knob(), 0.0);
    }
}
