//! Stirring score
//!
//! Angular speed of the spoon around the bowl centre is classified into bands.
//! Only the sweet spot makes progress and earns rhythm; the mixture thins as
//! progress rises, so later progress comes faster.

use serde::{Deserialize, Serialize};

use super::{ScoreBreakdown, ScoreComponent};

/// Angular speed band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBand {
    TooSlow,
    SweetSpot,
    TooFast,
}

/// Stirring utensil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Utensil {
    Whisk,
    Spoon,
    Spatula,
}

impl Utensil {
    /// Progress multiplier
    pub fn efficiency(&self) -> f64 {
        match self {
            Utensil::Whisk => 1.25,
            Utensil::Spoon => 1.0,
            Utensil::Spatula => 0.8,
        }
    }
}

/// Stirring tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StirringParams {
    pub target_progress: f64,
    /// Slowest angular speed (rad/s) that makes progress
    pub min_effective_speed: f64,
    /// Fastest angular speed (rad/s) that makes progress
    pub max_effective_speed: f64,
    /// Progress per second in the sweet spot before modifiers
    pub base_rate: f64,
    pub utensil: Utensil,
    /// Thickness of the mixture, 0 (thin) to 1 (stiff)
    pub viscosity: f64,
    pub rhythm_rate: f64,
    pub rhythm_cap: f64,
    pub circularity_cap: f64,
    pub completion_bonus: f64,
    /// Weight of the progress fraction in the final score
    pub progress_weight: f64,
    pub too_fast_penalty: f64,
    /// Fraction of the target after which stirring too fast is penalised
    pub closing_window: f64,
    /// Radius samples needed before circularity counts
    pub min_radius_samples: u32,
}

impl Default for StirringParams {
    fn default() -> Self {
        Self {
            target_progress: 100.0,
            min_effective_speed: 0.5,
            max_effective_speed: 8.0,
            base_rate: 15.0,
            utensil: Utensil::Spoon,
            viscosity: 0.3,
            rhythm_rate: 2.0,
            rhythm_cap: 15.0,
            circularity_cap: 15.0,
            completion_bonus: 20.0,
            progress_weight: 50.0,
            too_fast_penalty: 10.0,
            closing_window: 0.8,
            min_radius_samples: 10,
        }
    }
}

impl StirringParams {
    /// Tuning for a difficulty tier; harder means thicker mixtures
    pub fn for_difficulty(difficulty: u8) -> Self {
        let d = difficulty.clamp(1, 5) as f64;
        Self {
            viscosity: 0.15 * d,
            utensil: if d <= 2.0 { Utensil::Whisk } else { Utensil::Spoon },
            ..Self::default()
        }
    }

    /// Classify an angular speed
    pub fn band(&self, speed: f64) -> SpeedBand {
        if speed > self.max_effective_speed {
            SpeedBand::TooFast
        } else if speed >= self.min_effective_speed {
            SpeedBand::SweetSpot
        } else {
            SpeedBand::TooSlow
        }
    }

    /// Progress per second in the sweet spot at the given progress
    pub fn progress_rate(&self, progress: f64) -> f64 {
        let remaining = 1.0 - (progress / self.target_progress).clamp(0.0, 1.0);
        let resistance = 1.0 - 0.5 * self.viscosity.clamp(0.0, 1.0) * remaining;
        self.base_rate * self.utensil.efficiency() * resistance
    }

    /// Whether progress has entered the closing window
    pub fn in_closing_window(&self, progress: f64) -> bool {
        progress >= self.target_progress * self.closing_window
    }
}

/// Streaming mean/variance (Welford)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u32,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / self.count as f64).sqrt()
        }
    }

    /// Standard deviation relative to the mean
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        (self.mean > f64::EPSILON).then(|| self.std_dev() / self.mean)
    }
}

/// Accumulated stirring signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StirTally {
    pub progress: f64,
    pub rhythm: f64,
    /// Spoon radius sampled while in the sweet spot
    pub radius: RunningStats,
    /// Set when the spoon went too fast inside the closing window
    pub too_fast_near_end: bool,
}

/// Step score from accumulated stirring signals
pub fn score_stirring(tally: &StirTally, params: &StirringParams) -> ScoreBreakdown {
    let fraction = if params.target_progress > 0.0 {
        tally.progress / params.target_progress
    } else {
        1.0
    };
    let reached = fraction >= 1.0;

    let circularity = match tally.radius.coefficient_of_variation() {
        Some(cv) if tally.radius.count() >= params.min_radius_samples => {
            params.circularity_cap * (1.0 - cv).clamp(0.0, 1.0)
        }
        _ => 0.0,
    };

    ScoreBreakdown::from_components([
        ScoreComponent::bonus("progress", fraction * params.progress_weight, params.progress_weight),
        ScoreComponent::bonus(
            "completion",
            if reached { params.completion_bonus } else { 0.0 },
            params.completion_bonus,
        ),
        ScoreComponent::bonus("rhythm", tally.rhythm, params.rhythm_cap),
        ScoreComponent::bonus("circularity", circularity, params.circularity_cap),
        ScoreComponent::penalty(
            "too_fast",
            if tally.too_fast_near_end { params.too_fast_penalty } else { 0.0 },
            params.too_fast_penalty,
        ),
    ])
}
