//! Tier and combo strategy
//!
//! Discrete actions (a cut, a pour) are classified into a [`Tier`]. Each tier
//! carries base points, whether the combo multiplier applies, and what it
//! does to the combo. The multiplier used for an action is the one earned by
//! the actions before it.

use serde::{Deserialize, Serialize};

/// Quality tier of one graded action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Poor,
    Good,
    Great,
    Perfect,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Perfect => "Perfect!",
            Tier::Great => "Great!",
            Tier::Good => "Good",
            Tier::Poor => "Poor",
        }
    }
}

/// What a tier does to the running combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboEffect {
    /// Combo grows by one
    Extend,
    /// Combo shrinks by one, never below zero
    Decay,
    /// Combo resets to zero
    Break,
}

/// Scoring rule for one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub base_points: f64,
    /// Whether the combo multiplier scales `base_points`
    pub multiplied: bool,
    pub combo: ComboEffect,
}

impl TierRule {
    pub const fn new(base_points: f64, multiplied: bool, combo: ComboEffect) -> Self {
        Self {
            base_points,
            multiplied,
            combo,
        }
    }
}

/// Per-mini-game tier rules and multiplier curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub perfect: TierRule,
    pub great: TierRule,
    pub good: TierRule,
    pub poor: TierRule,
    /// Multiplier gained per combo step
    pub multiplier_step: f64,
    /// Highest multiplier
    pub multiplier_cap: f64,
}

impl TierTable {
    /// Rule for a tier
    pub fn rule(&self, tier: Tier) -> &TierRule {
        match tier {
            Tier::Perfect => &self.perfect,
            Tier::Great => &self.great,
            Tier::Good => &self.good,
            Tier::Poor => &self.poor,
        }
    }

    /// Multiplier earned by a combo
    pub fn multiplier(&self, combo: u32) -> f64 {
        (1.0 + combo as f64 * self.multiplier_step).min(self.multiplier_cap)
    }

    /// Most points a single action can earn
    pub fn max_points(&self) -> f64 {
        [self.perfect, self.great, self.good, self.poor]
            .iter()
            .map(|r| if r.multiplied { r.base_points * self.multiplier_cap } else { r.base_points })
            .fold(0.0, f64::max)
    }
}

/// Result of grading one action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Graded {
    pub tier: Tier,
    pub points: f64,
    /// Multiplier applied to this action
    pub multiplier: f64,
    /// Combo after this action
    pub combo: u32,
}

/// Running combo state
#[derive(Debug, Clone, PartialEq)]
pub struct ComboTracker {
    table: TierTable,
    combo: u32,
    best_combo: u32,
    total_points: f64,
    graded: u32,
}

impl ComboTracker {
    pub fn new(table: TierTable) -> Self {
        Self {
            table,
            combo: 0,
            best_combo: 0,
            total_points: 0.0,
            graded: 0,
        }
    }

    /// Score one action and update the combo
    pub fn grade(&mut self, tier: Tier) -> Graded {
        let rule = *self.table.rule(tier);
        let multiplier = if rule.multiplied { self.multiplier() } else { 1.0 };
        let points = rule.base_points * multiplier;

        self.combo = match rule.combo {
            ComboEffect::Extend => self.combo + 1,
            ComboEffect::Decay => self.combo.saturating_sub(1),
            ComboEffect::Break => 0,
        };
        self.best_combo = self.best_combo.max(self.combo);
        self.total_points += points;
        self.graded += 1;

        Graded {
            tier,
            points,
            multiplier,
            combo: self.combo,
        }
    }

    /// Current combo
    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Longest combo reached
    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    /// Multiplier the next multiplied action will receive
    pub fn multiplier(&self) -> f64 {
        self.table.multiplier(self.combo)
    }

    /// Points accumulated so far
    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    /// Number of graded actions
    pub fn graded(&self) -> u32 {
        self.graded
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }
}
