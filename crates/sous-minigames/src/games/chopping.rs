//! Chopping
//!
//! The knife slides along the board following the pointer. A chop (click,
//! Space or J) grades the knife position against the next slice mark.

use serde::{Deserialize, Serialize};
use sous_core::math::SmoothDamp;
use sous_core::{DVec2, DeltaTime, Feedback, FeedbackSink, ParticleKind, SoundCue};

use crate::input::MiniGameInput;
use crate::scoring::chopping::{CHOPPING_TIERS, cut_tier, score_chopping, slice_marks};
use crate::scoring::{ComboTracker, Graded, ScoreBreakdown, Tier};
use crate::session::{MiniGame, Readout};
use crate::MiniGameKind;

/// Chopping tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChoppingParams {
    pub target_cuts: u32,
    /// Board half-width the pointer maps onto
    pub knife_reach: f64,
    /// Knife smoothing time in seconds
    pub smooth_time: f64,
    /// Seconds between chops
    pub lockout: f64,
}

impl Default for ChoppingParams {
    fn default() -> Self {
        Self {
            target_cuts: 8,
            knife_reach: 0.3,
            smooth_time: 0.05,
            lockout: 0.18,
        }
    }
}

impl ChoppingParams {
    pub fn for_difficulty(difficulty: u8) -> Self {
        Self {
            target_cuts: 4 + difficulty.clamp(1, 5) as u32,
            ..Self::default()
        }
    }
}

/// Live chopping state
#[derive(Debug, Clone)]
pub struct ChoppingGame {
    params: ChoppingParams,
    marks: Vec<f64>,
    knife: SmoothDamp,
    knife_target: f64,
    cuts: u32,
    tracker: ComboTracker,
    cooldown: f64,
    last_cut: Option<Graded>,
}

impl ChoppingGame {
    pub fn new(params: ChoppingParams) -> Self {
        Self {
            marks: slice_marks(params.target_cuts as usize),
            knife: SmoothDamp::new(0.0, params.smooth_time),
            knife_target: 0.0,
            cuts: 0,
            tracker: ComboTracker::new(CHOPPING_TIERS),
            cooldown: 0.0,
            last_cut: None,
            params,
        }
    }

    /// Slice mark for the next cut
    pub fn next_mark(&self) -> Option<f64> {
        self.marks.get(self.cuts as usize).copied()
    }

    /// Smoothed knife position
    pub fn knife_x(&self) -> f64 {
        self.knife.value
    }

    pub fn cuts(&self) -> u32 {
        self.cuts
    }

    pub fn last_cut(&self) -> Option<&Graded> {
        self.last_cut.as_ref()
    }

    fn aim(&mut self, x: f64) {
        if x.is_nan() {
            return;
        }
        let reach = self.params.knife_reach;
        self.knife_target = x.clamp(-reach, reach);
    }

    fn chop(&mut self, fx: &mut dyn FeedbackSink) {
        if self.cooldown > 0.0 {
            return;
        }
        let Some(mark) = self.next_mark() else {
            return;
        };

        let distance = self.knife.value - mark;
        let graded = self.tracker.grade(cut_tier(distance));
        self.cuts += 1;
        self.cooldown = self.params.lockout;
        self.last_cut = Some(graded);
        log::debug!(
            "Cut {}/{}: off by {:.3} -> {:?} ({:.1} pts, x{:.1})",
            self.cuts,
            self.params.target_cuts,
            distance.abs(),
            graded.tier,
            graded.points,
            graded.multiplier
        );

        fx.emit(Feedback::Sound(SoundCue::Hit));
        fx.emit(Feedback::ParticleBurst {
            kind: ParticleKind::Chop,
            at: DVec2::new(mark, 0.0),
            count: if graded.tier == Tier::Perfect { 16 } else { 8 },
        });
        fx.emit(Feedback::CameraShake {
            intensity: 0.02,
            duration: 0.1,
        });
    }
}

impl MiniGame for ChoppingGame {
    fn kind(&self) -> MiniGameKind {
        MiniGameKind::Chopping
    }

    fn handle_input(&mut self, input: &MiniGameInput, fx: &mut dyn FeedbackSink) {
        match *input {
            MiniGameInput::PointerMove { x, .. } => self.aim(x * self.params.knife_reach),
            MiniGameInput::PointerDrag { dx, .. } => {
                self.aim(self.knife_target + dx * self.params.knife_reach)
            }
            MiniGameInput::PointerDown => self.chop(fx),
            MiniGameInput::KeyDown(key) if key.is_action() => self.chop(fx),
            _ => {}
        }
    }

    fn update(&mut self, dt: DeltaTime, _fx: &mut dyn FeedbackSink) {
        let dt = dt.as_secs();
        self.knife.update(self.knife_target, dt);
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    fn is_complete(&self) -> bool {
        self.cuts >= self.params.target_cuts
    }

    fn is_trivial(&self) -> bool {
        self.params.target_cuts == 0
    }

    fn breakdown(&self) -> ScoreBreakdown {
        score_chopping(self.tracker.total_points(), self.params.target_cuts)
    }

    fn readout(&self) -> Readout {
        let target = self.params.target_cuts.max(1) as f64;
        Readout {
            progress: (self.cuts as f64 / target).min(1.0),
            combo: self.tracker.combo(),
            chopping_points: Some(self.tracker.total_points().round() as u32),
            cue: self.next_mark().map(|x| DVec2::new(x, 0.0)),
            tool: Some(DVec2::new(self.knife.value, 0.0)),
            status: self.last_cut.map_or("Line up the knife", |g| g.tier.label()),
            ..Readout::default()
        }
    }
}
