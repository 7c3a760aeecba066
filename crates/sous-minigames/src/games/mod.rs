//! Mini-game state machines
//!
//! One module per mini-game type. Each owns its transient counters and
//! hands them to the matching scoring function.

pub mod chopping;
pub mod heat;
pub mod measuring;
pub mod plating;
pub mod stirring;

pub use chopping::{ChoppingGame, ChoppingParams};
pub use heat::HeatGame;
pub use measuring::{Ingredient, MeasuringGame, MeasuringParams};
pub use plating::{PlatingGame, PlatingParams};
pub use stirring::StirringGame;

use crate::session::MiniGame;
use crate::{MiniGameConfig, MiniGameKind};

/// Create the game a binding describes, tuned for its difficulty
pub fn build(config: &MiniGameConfig) -> Box<dyn MiniGame> {
    let difficulty = config.tier();
    match config.kind {
        MiniGameKind::Chopping => Box::new(ChoppingGame::new(ChoppingParams::for_difficulty(difficulty))),
        MiniGameKind::Stirring => Box::new(StirringGame::new(
            crate::scoring::stirring::StirringParams::for_difficulty(difficulty),
        )),
        MiniGameKind::HeatControl => Box::new(HeatGame::new(
            crate::scoring::heat::HeatParams::for_difficulty(difficulty),
        )),
        MiniGameKind::Measuring => Box::new(MeasuringGame::new(MeasuringParams::for_difficulty(difficulty))),
        MiniGameKind::Plating => Box::new(PlatingGame::new(PlatingParams::default())),
    }
}
