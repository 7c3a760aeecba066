//! Simulation Time
//!
//! All gameplay timing is measured in accumulated simulation seconds:
//! - Per-frame deltas, clamped and scaled
//! - Pause that freezes accrual without losing the last state
//! - Fixed-step accumulation for deterministic drivers
//! - Countdown timers for step durations and mini-game time limits

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest delta a frame may report
pub const MIN_FRAME_DELTA: f64 = 0.0001;
/// Largest delta a frame may report before it is clamped
pub const MAX_FRAME_DELTA: f64 = 0.25;

/// Delta time wrapper for type safety
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DeltaTime(pub f64);

impl DeltaTime {
    /// No time elapsed
    pub const ZERO: Self = Self(0.0);

    /// Create a new delta time from seconds
    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Create a new delta time from milliseconds
    pub fn from_millis(millis: f64) -> Self {
        Self(millis / 1000.0)
    }

    /// Get the delta time in seconds
    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Get the delta time in milliseconds
    pub fn as_millis(&self) -> f64 {
        self.0 * 1000.0
    }

    /// True when no simulation time passes this frame
    pub fn is_zero(&self) -> bool {
        self.0 <= 0.0
    }
}

impl Default for DeltaTime {
    fn default() -> Self {
        Self(1.0 / 60.0)
    }
}

impl From<Duration> for DeltaTime {
    fn from(duration: Duration) -> Self {
        Self(duration.as_secs_f64())
    }
}

/// Fixed time step configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedTimeStep {
    /// Fixed timestep in seconds
    pub step: f64,
    /// Maximum number of fixed updates per frame
    pub max_updates: u32,
}

impl Default for FixedTimeStep {
    fn default() -> Self {
        Self {
            step: 1.0 / 60.0,
            max_updates: 8,
        }
    }
}

impl FixedTimeStep {
    /// Create a new fixed time step with the given frequency
    pub fn from_hz(hz: f64) -> Self {
        Self {
            step: 1.0 / hz,
            ..Self::default()
        }
    }

    /// Create a new fixed time step with the given step size
    pub fn from_step(step: f64) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// Set the maximum number of updates per frame
    pub fn with_max_updates(mut self, max: u32) -> Self {
        self.max_updates = max;
        self
    }
}

/// Simulation clock fed by frame deltas
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Total simulated seconds
    total_time: f64,
    /// Scaled delta of the last frame
    delta_time: f64,
    /// Accumulated time for fixed updates
    fixed_accumulator: f64,
    frame_count: u64,
    fixed_update_count: u64,
    /// Time scale (for slow motion or fast forward)
    time_scale: f64,
    paused: bool,
}

impl SimClock {
    /// Create a new clock at time zero
    pub fn new() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_accumulator: 0.0,
            frame_count: 0,
            fixed_update_count: 0,
            time_scale: 1.0,
            paused: false,
        }
    }

    /// Advance the clock by one frame and return the simulated delta
    pub fn update(&mut self, delta_time: f64) -> DeltaTime {
        let clamped_dt = delta_time.clamp(MIN_FRAME_DELTA, MAX_FRAME_DELTA);
        let scaled_dt = if self.paused { 0.0 } else { clamped_dt * self.time_scale };

        self.delta_time = scaled_dt;
        self.total_time += scaled_dt;
        self.fixed_accumulator += scaled_dt;
        self.frame_count += 1;

        DeltaTime(scaled_dt)
    }

    /// Check if a fixed update should run
    pub fn should_run_fixed_update(&self, fixed_step: f64) -> bool {
        self.fixed_accumulator >= fixed_step
    }

    /// Consume time for a fixed update
    pub fn consume_fixed_update(&mut self, fixed_step: f64) {
        self.fixed_accumulator -= fixed_step;
        self.fixed_update_count += 1;
    }

    /// Get the number of fixed updates needed this frame
    pub fn fixed_updates_needed(&self, config: &FixedTimeStep) -> u32 {
        let updates = (self.fixed_accumulator / config.step) as u32;
        updates.min(config.max_updates)
    }

    /// Drop accumulated time that exceeded the per-frame update budget
    pub fn discard_backlog(&mut self, fixed_step: f64) {
        self.fixed_accumulator = self.fixed_accumulator.min(fixed_step);
    }

    /// Get the delta time for the current frame
    pub fn delta_time(&self) -> DeltaTime {
        DeltaTime(self.delta_time)
    }

    /// Get the total simulated time
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed update count
    pub fn fixed_update_count(&self) -> u64 {
        self.fixed_update_count
    }

    /// Get the time scale
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Set the time scale
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.max(0.0);
    }

    /// Check if the clock is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the clock
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the clock
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Countdown over simulation seconds
///
/// Used for step durations and mini-game time limits. A countdown with a
/// non-positive duration is already expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    duration: f64,
    elapsed: f64,
    repeating: bool,
    finished: bool,
}

impl Countdown {
    /// Create a new one-shot countdown
    pub fn new(duration_secs: f64) -> Self {
        let duration = duration_secs.max(0.0);
        Self {
            duration,
            elapsed: 0.0,
            repeating: false,
            finished: duration <= 0.0,
        }
    }

    /// Create a new repeating countdown
    pub fn repeating(duration_secs: f64) -> Self {
        Self {
            duration: duration_secs.max(MIN_FRAME_DELTA),
            elapsed: 0.0,
            repeating: true,
            finished: false,
        }
    }

    /// Advance the countdown, returning true on the frame it expires
    pub fn tick(&mut self, delta: DeltaTime) -> bool {
        if self.finished && !self.repeating {
            return false;
        }

        self.elapsed += delta.as_secs().max(0.0);

        if self.elapsed >= self.duration {
            if self.repeating {
                self.elapsed -= self.duration;
            } else {
                self.elapsed = self.duration;
                self.finished = true;
            }
            true
        } else {
            false
        }
    }

    /// Check if the countdown has expired
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get the progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    /// Restart from the full duration
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.finished = self.duration <= 0.0 && !self.repeating;
    }

    /// Get the remaining seconds
    pub fn remaining(&self) -> f64 {
        (self.duration - self.elapsed).max(0.0)
    }

    /// Get the elapsed seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Get the configured duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }
}
