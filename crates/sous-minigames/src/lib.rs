//! # Sous Mini-Games
//!
//! Timed, input-driven challenges that gate recipe steps.
//!
//! ## Features
//! - Pure scoring functions for chopping, stirring, heat control, measuring and plating
//! - Shared tier/combo strategy used wherever discrete actions are graded
//! - Session wrapper enforcing time limits, pause and single-shot completion
//! - Readouts for the presentation layer (temperature, mixing progress, cuts)

pub mod games;
pub mod input;
pub mod scoring;
pub mod session;

pub use input::{Key, MiniGameInput, PlateTool};
pub use scoring::{ComboTracker, ScoreBreakdown, ScoreComponent, Tier, TierTable};
pub use session::{MiniGame, MiniGameSession, Readout, SessionOutcome};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mini-game errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MiniGameError {
    #[error("Difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),

    #[error("Time limit must be positive, got {0}")]
    InvalidTimeLimit(f64),

    #[error("Target score must be at most 100, got {0}")]
    InvalidTargetScore(u32),
}

/// Result type for mini-game operations
pub type MiniGameResult<T> = Result<T, MiniGameError>;

/// Lowest difficulty tier
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest difficulty tier
pub const MAX_DIFFICULTY: u8 = 5;

/// Mini-game type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiniGameKind {
    Chopping,
    Stirring,
    HeatControl,
    Measuring,
    Plating,
}

impl MiniGameKind {
    /// All kinds in presentation order
    pub const ALL: [MiniGameKind; 5] = [
        Self::Chopping,
        Self::Stirring,
        Self::HeatControl,
        Self::Measuring,
        Self::Plating,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chopping => "Chopping",
            Self::Stirring => "Stirring",
            Self::HeatControl => "Heat Control",
            Self::Measuring => "Measuring",
            Self::Plating => "Plating",
        }
    }
}

impl std::fmt::Display for MiniGameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Final mini-game score, always within `[0, 100]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32")]
pub struct Score(u8);

impl Score {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Round and clamp a raw value; NaN becomes zero
    pub fn from_raw(value: f64) -> Self {
        Self(sous_core::math::clamp_percent(value).round() as u8)
    }

    /// Get the score as an integer
    pub fn value(&self) -> u32 {
        self.0 as u32
    }
}

impl From<u32> for Score {
    fn from(value: u32) -> Self {
        Self(value.min(100) as u8)
    }
}

impl From<Score> for u32 {
    fn from(score: Score) -> Self {
        score.value()
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mini-game binding as authored in recipe data
///
/// `target_score` and `time_limit` default from the difficulty when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct MiniGameDef {
    kind: MiniGameKind,
    difficulty: u8,
    #[serde(default)]
    target_score: Option<u32>,
    #[serde(default)]
    time_limit: Option<f64>,
}

/// Mini-game binding on a recipe step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "MiniGameDef")]
pub struct MiniGameConfig {
    pub kind: MiniGameKind,
    /// Difficulty tier, 1 to 5
    pub difficulty: u8,
    /// Score the player is aiming for
    pub target_score: u32,
    /// Seconds before the session force-completes
    pub time_limit: f64,
}

impl From<MiniGameDef> for MiniGameConfig {
    fn from(def: MiniGameDef) -> Self {
        let defaults = Self::new(def.kind, def.difficulty);
        Self {
            target_score: def.target_score.unwrap_or(defaults.target_score),
            time_limit: def.time_limit.unwrap_or(defaults.time_limit),
            ..defaults
        }
    }
}

impl MiniGameConfig {
    /// Binding with difficulty-derived target score and time limit
    pub fn new(kind: MiniGameKind, difficulty: u8) -> Self {
        let d = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY) as u32;
        Self {
            kind,
            difficulty,
            target_score: 70 + d * 5,
            time_limit: 30.0 + (5 - d) as f64 * 10.0,
        }
    }

    /// Override the time limit
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = seconds;
        self
    }

    /// Difficulty clamped into the supported range
    pub fn tier(&self) -> u8 {
        self.difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }

    /// Check the binding is playable
    pub fn validate(&self) -> MiniGameResult<()> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(MiniGameError::InvalidDifficulty(self.difficulty));
        }
        if !(self.time_limit > 0.0) {
            return Err(MiniGameError::InvalidTimeLimit(self.time_limit));
        }
        if self.target_score > 100 {
            return Err(MiniGameError::InvalidTargetScore(self.target_score));
        }
        Ok(())
    }
}
