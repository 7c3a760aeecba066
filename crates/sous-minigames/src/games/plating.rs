//! Plating
//!
//! Pick items from the palette and place them on the plate, draw a sauce
//! trace, then submit. The plate is scored once, on submission or timeout.

use serde::{Deserialize, Serialize};
use sous_core::{DVec2, DeltaTime, Feedback, FeedbackSink, ParticleKind, SoundCue};

use crate::input::{Key, MiniGameInput, PlateTool};
use crate::scoring::plating::{IDEAL_ITEM_RANGE, PlacedItem, score_plating};
use crate::scoring::ScoreBreakdown;
use crate::session::{MiniGame, Readout};
use crate::MiniGameKind;

/// Plating tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatingParams {
    /// Pointer-to-plate scale for item placement
    pub placement_scale: f64,
    /// Pointer-to-plate scale for sauce drawing
    pub sauce_scale: f64,
    /// Sauce points further out than this land off the plate and are dropped
    pub sauce_radius: f64,
    /// Most items the plate can hold
    pub max_items: usize,
}

impl Default for PlatingParams {
    fn default() -> Self {
        Self {
            placement_scale: 0.15,
            sauce_scale: 0.12,
            sauce_radius: 0.13,
            max_items: 12,
        }
    }
}

/// Live plating state
#[derive(Debug, Clone)]
pub struct PlatingGame {
    params: PlatingParams,
    cursor: DVec2,
    tool: Option<PlateTool>,
    items: Vec<PlacedItem>,
    sauce: Vec<DVec2>,
    drawing: bool,
    submitted: bool,
}

impl PlatingGame {
    pub fn new(params: PlatingParams) -> Self {
        Self {
            params,
            cursor: DVec2::ZERO,
            tool: None,
            items: Vec::new(),
            sauce: Vec::new(),
            drawing: false,
            submitted: false,
        }
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn sauce_points(&self) -> usize {
        self.sauce.len()
    }

    pub fn tool(&self) -> Option<PlateTool> {
        self.tool
    }

    fn move_cursor(&mut self, to: DVec2) {
        if to.is_nan() {
            return;
        }
        self.cursor = to.clamp(DVec2::NEG_ONE, DVec2::ONE);
        if self.drawing {
            self.add_sauce();
        }
    }

    fn add_sauce(&mut self) {
        let point = self.cursor * self.params.sauce_scale;
        if point.length() <= self.params.sauce_radius {
            self.sauce.push(point);
        }
    }

    fn press(&mut self, fx: &mut dyn FeedbackSink) {
        match self.tool {
            Some(PlateTool::Item(item)) => {
                if self.items.len() >= self.params.max_items {
                    return;
                }
                let at = self.cursor * self.params.placement_scale;
                self.items.push(PlacedItem { item, position: at });
                log::debug!("Placed {:?} at ({:.3}, {:.3})", item, at.x, at.y);
                fx.emit(Feedback::Sound(SoundCue::Place));
                fx.emit(Feedback::ParticleBurst {
                    kind: ParticleKind::Sparkle,
                    at,
                    count: 4,
                });
            }
            Some(PlateTool::Sauce) => {
                self.drawing = true;
                self.add_sauce();
            }
            None => {}
        }
    }
}

impl MiniGame for PlatingGame {
    fn kind(&self) -> MiniGameKind {
        MiniGameKind::Plating
    }

    fn handle_input(&mut self, input: &MiniGameInput, fx: &mut dyn FeedbackSink) {
        if self.submitted {
            return;
        }
        match *input {
            MiniGameInput::Select(tool) => {
                self.drawing = false;
                self.tool = Some(tool);
            }
            MiniGameInput::PointerMove { x, y } => self.move_cursor(DVec2::new(x, y)),
            MiniGameInput::PointerDrag { dx, dy } => self.move_cursor(self.cursor + DVec2::new(dx, dy)),
            MiniGameInput::PointerDown => self.press(fx),
            MiniGameInput::PointerUp => self.drawing = false,
            MiniGameInput::KeyDown(Key::Backspace) => {
                self.items.pop();
            }
            MiniGameInput::KeyDown(Key::Enter) => {
                log::debug!("Plate submitted with {} items", self.items.len());
                self.submitted = true;
            }
            _ => {}
        }
    }

    fn update(&mut self, _dt: DeltaTime, _fx: &mut dyn FeedbackSink) {}

    fn is_complete(&self) -> bool {
        self.submitted
    }

    fn breakdown(&self) -> ScoreBreakdown {
        score_plating(&self.items, self.sauce.len())
    }

    fn readout(&self) -> Readout {
        let ideal = *IDEAL_ITEM_RANGE.start() as f64;
        Readout {
            progress: (self.items.len() as f64 / ideal).min(1.0),
            tool: Some(self.cursor * self.params.placement_scale),
            status: match self.tool {
                None => "Pick an item",
                Some(PlateTool::Sauce) => "Draw the sauce",
                Some(PlateTool::Item(_)) => "Place on the plate",
            },
            ..Readout::default()
        }
    }
}
