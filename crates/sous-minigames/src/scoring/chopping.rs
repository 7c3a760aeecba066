//! Chopping score
//!
//! Each cut is graded by the distance between the knife and the slice mark.
//! The step score is the accumulated points over the most a run of perfect
//! cuts without a multiplier would earn.

use super::{ComboEffect, ScoreBreakdown, ScoreComponent, Tier, TierRule, TierTable};
use crate::Score;

/// Knife-to-mark distance below which a cut is perfect
pub const PERFECT_DISTANCE: f64 = 0.02;
/// Knife-to-mark distance below which a cut is good
pub const GOOD_DISTANCE: f64 = 0.05;
/// Base points of a perfect cut, and the per-cut normaliser
pub const MAX_CUT_POINTS: f64 = 10.0;

/// Half-width of the span the slice marks cover
pub const MARK_SPAN: f64 = 0.25;

/// Tier rules for cuts
pub const CHOPPING_TIERS: TierTable = TierTable {
    perfect: TierRule::new(MAX_CUT_POINTS, true, ComboEffect::Extend),
    // Cuts never grade as great; it mirrors good.
    great: TierRule::new(6.0, false, ComboEffect::Decay),
    good: TierRule::new(6.0, false, ComboEffect::Decay),
    poor: TierRule::new(2.0, false, ComboEffect::Break),
    multiplier_step: 0.1,
    multiplier_cap: 2.0,
};

/// Classify a cut by its distance from the mark
pub fn cut_tier(distance: f64) -> Tier {
    let distance = distance.abs();
    if distance < PERFECT_DISTANCE {
        Tier::Perfect
    } else if distance < GOOD_DISTANCE {
        Tier::Good
    } else {
        Tier::Poor
    }
}

/// Evenly spaced slice marks across the board
pub fn slice_marks(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n)
            .map(|i| -MARK_SPAN + (i as f64 / (n - 1) as f64) * 2.0 * MARK_SPAN)
            .collect(),
    }
}

/// Step score from accumulated cut points
///
/// Zero target cuts is nothing to do and scores the maximum.
pub fn score_chopping(total_points: f64, target_cuts: u32) -> ScoreBreakdown {
    if target_cuts == 0 {
        return ScoreBreakdown::flat("cuts", Score::MAX);
    }
    let normalised = 100.0 * total_points / (target_cuts as f64 * MAX_CUT_POINTS);
    ScoreBreakdown::from_components([ScoreComponent::bonus("cuts", normalised, 100.0)])
}
