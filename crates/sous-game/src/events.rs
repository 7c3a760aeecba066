//! Game events published by the kitchen

use serde::Serialize;
use sous_core::{LevelChange, Notice};
use sous_minigames::{MiniGameKind, SessionOutcome};

use crate::orchestrator::{Completion, GamePhase};
use crate::rating::RecipeReward;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
    },
    RecipeStarted {
        recipe_id: String,
        step_count: usize,
    },
    MiniGameStarted {
        step_index: usize,
        kind: MiniGameKind,
    },
    MiniGameFinished {
        step_index: usize,
        outcome: SessionOutcome,
    },
    /// Mini-game left without a score
    MiniGameCancelled {
        step_index: usize,
        kind: MiniGameKind,
    },
    StepCompleted {
        step_index: usize,
        score: u32,
        total_score: u32,
    },
    RecipeCompleted {
        recipe_id: String,
        completion: Completion,
        reward: RecipeReward,
        level: LevelChange,
    },
    Notice(Notice),
}
