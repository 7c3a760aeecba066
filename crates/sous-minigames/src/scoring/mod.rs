//! Scoring Engine
//!
//! Pure functions from accumulated play signals to a `[0, 100]` score. Every
//! sub-score is clamped to its own range before summing and the sum is
//! clamped again, so no input sequence can push a score out of range.

pub mod chopping;
pub mod combo;
pub mod heat;
pub mod measuring;
pub mod plating;
pub mod stirring;

pub use combo::{ComboEffect, ComboTracker, Graded, Tier, TierRule, TierTable};

use serde::Serialize;
use smallvec::SmallVec;

use crate::Score;

/// One named contribution to a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub name: &'static str,
    /// Clamped contribution (negative for penalties)
    pub value: f64,
    /// Largest magnitude this component can reach
    pub max: f64,
}

impl ScoreComponent {
    /// Bonus in `[0, max]`
    pub fn bonus(name: &'static str, value: f64, max: f64) -> Self {
        Self {
            name,
            value: clamp_range(value, 0.0, max),
            max,
        }
    }

    /// Penalty of `value` points, stored as `[-max, 0]`
    pub fn penalty(name: &'static str, value: f64, max: f64) -> Self {
        Self {
            name,
            value: -clamp_range(value, 0.0, max),
            max,
        }
    }

    pub fn is_penalty(&self) -> bool {
        self.value < 0.0
    }
}

fn clamp_range(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

/// Final score with its named sub-scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total: Score,
    pub components: SmallVec<[ScoreComponent; 8]>,
}

impl ScoreBreakdown {
    /// Sum pre-clamped components and clamp the result
    pub fn from_components<I>(components: I) -> Self
    where
        I: IntoIterator<Item = ScoreComponent>,
    {
        let components: SmallVec<[ScoreComponent; 8]> = components.into_iter().collect();
        let raw: f64 = components.iter().map(|c| c.value).sum();
        Self {
            total: Score::from_raw(raw),
            components,
        }
    }

    /// A breakdown holding a single fixed value
    pub fn flat(name: &'static str, value: Score) -> Self {
        Self {
            total: value,
            components: smallvec::smallvec![ScoreComponent::bonus(name, value.value() as f64, 100.0)],
        }
    }

    /// Look up a component by name
    pub fn component(&self, name: &str) -> Option<f64> {
        self.components.iter().find(|c| c.name == name).map(|c| c.value)
    }

    /// Unclamped sum of the components
    pub fn raw_total(&self) -> f64 {
        self.components.iter().map(|c| c.value).sum()
    }
}

impl std::fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.total)?;
        let mut first = true;
        for c in &self.components {
            f.write_str(if first { " (" } else { ", " })?;
            write!(f, "{} {:+.1}", c.name, c.value)?;
            first = false;
        }
        if !first {
            f.write_str(")")?;
        }
        Ok(())
    }
}
