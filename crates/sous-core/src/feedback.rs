//! Cosmetic feedback commands
//!
//! Mini-games request particles, sounds and camera shake through a
//! [`FeedbackSink`] handed to them by the presentation layer. Nothing here
//! feeds back into scoring.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::events::EventBus;

/// Particle effect flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Chop,
    Splash,
    Steam,
    Smoke,
    Sparkle,
}

/// Sound cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Hit,
    Success,
    Sizzle,
    Pour,
    Place,
}

/// One feedback request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Feedback {
    ParticleBurst {
        kind: ParticleKind,
        at: DVec2,
        count: u32,
    },
    Sound(SoundCue),
    CameraShake {
        intensity: f64,
        duration: f64,
    },
}

/// Receiver of feedback requests
pub trait FeedbackSink {
    /// Handle one request
    fn emit(&mut self, feedback: Feedback);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn emit(&mut self, _feedback: Feedback) {}
}

/// Sink that records requests in order
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    pub entries: Vec<Feedback>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count recorded camera shakes
    pub fn shakes(&self) -> usize {
        self.entries
            .iter()
            .filter(|f| matches!(f, Feedback::CameraShake { .. }))
            .count()
    }

    /// Count recorded particle bursts of one kind
    pub fn bursts(&self, kind: ParticleKind) -> usize {
        self.entries
            .iter()
            .filter(|f| matches!(f, Feedback::ParticleBurst { kind: k, .. } if *k == kind))
            .count()
    }
}

impl FeedbackSink for FeedbackLog {
    fn emit(&mut self, feedback: Feedback) {
        self.entries.push(feedback);
    }
}

impl FeedbackSink for EventBus<Feedback> {
    fn emit(&mut self, feedback: Feedback) {
        self.publish(&feedback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_feedback_log() {
        let mut log = FeedbackLog::new();
        log.emit(Feedback::CameraShake { intensity: 0.1, duration: 0.2 });
        log.emit(Feedback::ParticleBurst { kind: ParticleKind::Chop, at: DVec2::ZERO, count: 8 });
        log.emit(Feedback::Sound(SoundCue::Hit));

        assert_eq!(log.shakes(), 1);
        assert_eq!(log.bursts(ParticleKind::Chop), 1);
        assert_eq!(log.bursts(ParticleKind::Smoke), 0);
    }

    #[test]
    fn test_bus_as_sink() {
        let shakes = Rc::new(Cell::new(0));
        let mut bus: EventBus<Feedback> = EventBus::new();
        let counter = Rc::clone(&shakes);
        bus.subscribe(move |f| {
            if matches!(f, Feedback::CameraShake { .. }) {
                counter.set(counter.get() + 1);
            }
        });

        let sink: &mut dyn FeedbackSink = &mut bus;
        sink.emit(Feedback::CameraShake { intensity: 0.05, duration: 0.1 });

        assert_eq!(shakes.get(), 1);
    }
}
