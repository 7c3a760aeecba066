//! Measuring score

use serde::{Deserialize, Serialize};

use super::{ComboEffect, ScoreBreakdown, ScoreComponent, Tier, TierRule, TierTable};
use crate::Score;

/// Tier rules for pours
pub const MEASURING_TIERS: TierTable = TierTable {
    perfect: TierRule::new(25.0, true, ComboEffect::Extend),
    great: TierRule::new(18.0, false, ComboEffect::Decay),
    good: TierRule::new(12.0, false, ComboEffect::Break),
    poor: TierRule::new(5.0, false, ComboEffect::Break),
    multiplier_step: 0.1,
    multiplier_cap: 2.0,
};

/// Weight of the average accuracy in the final score
pub const ACCURACY_WEIGHT: f64 = 0.6;
/// Bonus for confirming every pour
pub const COMPLETION_BONUS: f64 = 20.0;
/// Points per step of the closing combo
pub const COMBO_BONUS_PER_STEP: f64 = 2.0;
/// Largest combo bonus
pub const COMBO_BONUS_CAP: f64 = 20.0;

/// Accuracy of one pour, 0 to 100
pub fn pour_accuracy(target: f64, actual: f64) -> f64 {
    (100.0 - 200.0 * (target - actual).abs()).max(0.0)
}

/// Classify a pour by its accuracy
pub fn pour_tier(accuracy: f64) -> Tier {
    if accuracy >= 95.0 {
        Tier::Perfect
    } else if accuracy >= 80.0 {
        Tier::Great
    } else if accuracy >= 60.0 {
        Tier::Good
    } else {
        Tier::Poor
    }
}

/// One confirmed pour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PourResult {
    pub target: f64,
    pub actual: f64,
    pub accuracy: f64,
    pub tier: Tier,
    pub points: f64,
}

/// Step score from confirmed pours
///
/// Pours not yet confirmed count as zero accuracy. Zero planned pours is
/// nothing to do and scores the maximum.
pub fn score_measuring(pours: &[PourResult], planned: usize, combo: u32) -> ScoreBreakdown {
    if planned == 0 {
        return ScoreBreakdown::flat("accuracy", Score::MAX);
    }
    let accuracy_sum: f64 = pours.iter().take(planned).map(|p| p.accuracy).sum();
    let average = accuracy_sum / planned as f64;
    let complete = pours.len() >= planned;

    ScoreBreakdown::from_components([
        ScoreComponent::bonus("accuracy", average * ACCURACY_WEIGHT, 100.0 * ACCURACY_WEIGHT),
        ScoreComponent::bonus(
            "completion",
            if complete { COMPLETION_BONUS } else { 0.0 },
            COMPLETION_BONUS,
        ),
        ScoreComponent::bonus("combo", combo as f64 * COMBO_BONUS_PER_STEP, COMBO_BONUS_CAP),
    ])
}
