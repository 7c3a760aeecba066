//! Mini-game input
//!
//! Pointer and keyboard events after the presentation layer has normalised
//! them. Pointer coordinates are in `[-1, 1]` on both axes with +y up.

use serde::{Deserialize, Serialize};

use crate::scoring::plating::PlateItem;

/// Keys the mini-games react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Enter,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    /// Alternate chop key
    J,
    /// Alternate tilt-up key
    W,
    /// Alternate tilt-down key
    S,
}

impl Key {
    /// Keys that trigger a discrete action (chop, confirm pour)
    pub fn is_action(&self) -> bool {
        matches!(self, Key::Space | Key::Enter | Key::J)
    }

    /// +1 for "more", -1 for "less", 0 otherwise
    pub fn axis(&self) -> f64 {
        match self {
            Key::Up | Key::W | Key::Right => 1.0,
            Key::Down | Key::S | Key::Left => -1.0,
            _ => 0.0,
        }
    }
}

/// Plating palette selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlateTool {
    Item(PlateItem),
    Sauce,
}

/// Input event types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MiniGameInput {
    /// Pointer moved to an absolute position
    PointerMove { x: f64, y: f64 },
    /// Pointer moved by a relative amount (pointer lock / touch drag)
    PointerDrag { dx: f64, dy: f64 },
    /// Primary button or touch pressed
    PointerDown,
    /// Primary button or touch released
    PointerUp,
    /// Key pressed
    KeyDown(Key),
    /// Key released
    KeyUp(Key),
    /// Palette selection for plating
    Select(PlateTool),
}

impl MiniGameInput {
    /// Convenience constructor for an absolute pointer move
    pub fn pointer(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roles() {
        assert!(Key::Space.is_action());
        assert!(Key::J.is_action());
        assert!(!Key::Up.is_action());
        assert_eq!(Key::W.axis(), 1.0);
        assert_eq!(Key::Down.axis(), -1.0);
        assert_eq!(Key::Enter.axis(), 0.0);
    }
}
