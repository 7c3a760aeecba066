//! Heat control score

use serde::{Deserialize, Serialize};

use super::{ScoreBreakdown, ScoreComponent};

/// Heat control tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatParams {
    /// Target temperature on the 0-100 dial scale
    pub target: f64,
    /// Half-width of the success band
    pub band: f64,
    /// Distance above the band where burning starts
    pub danger_margin: f64,
    /// Seconds in band needed to finish
    pub hold: f64,
    /// Temperature lag; fraction of the gap closed per second
    pub approach_rate: f64,
    pub initial_temperature: f64,
    pub accuracy_cap: f64,
    pub time_bonus_cap: f64,
    pub completion_bonus: f64,
    /// Penalty points per second in the danger zone
    pub burn_rate: f64,
    pub burn_cap: f64,
}

impl Default for HeatParams {
    fn default() -> Self {
        Self {
            target: 70.0,
            band: 15.0,
            danger_margin: 10.0,
            hold: 10.0,
            approach_rate: 2.0,
            initial_temperature: 20.0,
            accuracy_cap: 50.0,
            time_bonus_cap: 30.0,
            completion_bonus: 20.0,
            burn_rate: 5.0,
            burn_cap: 30.0,
        }
    }
}

impl HeatParams {
    /// Tuning for a difficulty tier; harder means hotter and narrower
    pub fn for_difficulty(difficulty: u8) -> Self {
        let d = difficulty.clamp(1, 5) as f64;
        Self {
            target: 60.0 + 5.0 * d,
            band: 18.0 - 2.0 * d,
            hold: 6.0 + 3.0 * d,
            ..Self::default()
        }
    }

    pub fn band_min(&self) -> f64 {
        self.target - self.band
    }

    pub fn band_max(&self) -> f64 {
        self.target + self.band
    }

    /// Temperature above which the pan burns
    pub fn danger_threshold(&self) -> f64 {
        self.band_max() + self.danger_margin
    }

    pub fn in_band(&self, temperature: f64) -> bool {
        temperature >= self.band_min() && temperature <= self.band_max()
    }

    pub fn in_danger(&self, temperature: f64) -> bool {
        temperature > self.danger_threshold()
    }
}

/// Accumulated heat-control signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatTally {
    pub temperature: f64,
    pub time_in_band: f64,
    pub danger_time: f64,
}

/// Step score from accumulated heat signals
pub fn score_heat(tally: &HeatTally, params: &HeatParams) -> ScoreBreakdown {
    let accuracy = params.accuracy_cap - (tally.temperature - params.target).abs();
    let time_bonus = if params.hold > 0.0 {
        params.time_bonus_cap * tally.time_in_band / params.hold
    } else {
        params.time_bonus_cap
    };
    let held = tally.time_in_band >= params.hold;

    ScoreBreakdown::from_components([
        ScoreComponent::bonus("accuracy", accuracy, params.accuracy_cap),
        ScoreComponent::bonus("time_in_band", time_bonus, params.time_bonus_cap),
        ScoreComponent::bonus(
            "completion",
            if held { params.completion_bonus } else { 0.0 },
            params.completion_bonus,
        ),
        ScoreComponent::penalty("burn", tally.danger_time * params.burn_rate, params.burn_cap),
    ])
}
