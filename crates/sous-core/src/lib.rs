//! # Sous Core
//!
//! Core runtime library for the Sous cooking game.
//!
//! This crate provides the foundations every other crate builds on:
//! - **Time**: Simulation clock, fixed-step accumulation and countdowns
//! - **Math**: Interpolation and critically damped smoothing
//! - **Events**: Explicit publish/subscribe bus and player notices
//! - **Feedback**: Cosmetic particle, sound and camera-shake requests
//! - **Progression**: Contract for the XP/coin collaborator

pub mod events;
pub mod feedback;
pub mod math;
pub mod progression;
pub mod time;

pub use events::{EventBus, Notice, NoticeLevel, Subscription};
pub use feedback::{Feedback, FeedbackLog, FeedbackSink, NullFeedback, ParticleKind, SoundCue};
pub use math::DVec2;
pub use progression::{LevelChange, NullProgression, ProgressionSink, XpSource};
pub use time::{Countdown, DeltaTime, FixedTimeStep, SimClock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed simulation timestep in seconds
    pub fixed_timestep: f64,
    /// Maximum frame time before slowdown
    pub max_frame_time: f64,
    /// Maximum fixed updates run for one frame
    pub max_updates_per_frame: u32,
    /// Simulation speed multiplier
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_frame_time: 1.0 / 30.0,
            max_updates_per_frame: 8,
            time_scale: 1.0,
        }
    }
}

impl SimConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.fixed_timestep > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if self.max_frame_time < self.fixed_timestep {
            return Err(CoreError::InvalidConfig(
                "max_frame_time must be at least one fixed step".into(),
            ));
        }
        if self.max_updates_per_frame == 0 {
            return Err(CoreError::InvalidConfig("max_updates_per_frame must be non-zero".into()));
        }
        if self.time_scale < 0.0 {
            return Err(CoreError::InvalidConfig("time_scale must not be negative".into()));
        }
        Ok(())
    }

    /// Fixed step settings derived from this configuration
    pub fn fixed_step(&self) -> FixedTimeStep {
        FixedTimeStep::from_step(self.fixed_timestep).with_max_updates(self.max_updates_per_frame)
    }
}

/// Fixed-step frame driver
///
/// Turns variable frame deltas into a steady sequence of simulation ticks.
/// Everything in the game core advances from these ticks.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    config: SimConfig,
    clock: SimClock,
}

impl FrameDriver {
    /// Create a new driver with the given configuration
    pub fn new(config: SimConfig) -> Self {
        let mut clock = SimClock::new();
        clock.set_time_scale(config.time_scale);
        Self { config, clock }
    }

    /// Get the driver configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get the underlying clock
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Get mutable access to the clock (pause, time scale)
    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    /// Feed one rendered frame and run the fixed updates it paid for.
    ///
    /// Returns the number of ticks executed.
    pub fn advance<F>(&mut self, frame_time: f64, mut tick: F) -> u32
    where
        F: FnMut(DeltaTime),
    {
        self.clock.update(frame_time.min(self.config.max_frame_time));

        let step = self.config.fixed_step();
        let mut ran = 0;
        while self.clock.should_run_fixed_update(step.step) && ran < step.max_updates {
            tick(DeltaTime(step.step));
            self.clock.consume_fixed_update(step.step);
            ran += 1;
        }
        if ran == step.max_updates {
            self.clock.discard_backlog(step.step);
        }
        ran
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert!((config.fixed_timestep - 1.0 / 60.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = SimConfig::from_json(r#"{ "fixed_timestep": 0.01 }"#).unwrap();
        assert_eq!(config.fixed_timestep, 0.01);
        assert_eq!(config.max_updates_per_frame, 8);

        assert!(SimConfig::from_json(r#"{ "fixed_timestep": 0.0 }"#).is_err());
        assert!(SimConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_driver_runs_fixed_ticks() {
        let mut driver = FrameDriver::default();
        let mut ticks = 0;
        let mut simulated = 0.0;

        for _ in 0..60 {
            driver.advance(1.0 / 60.0 + 1e-9, |dt| {
                ticks += 1;
                simulated += dt.as_secs();
            });
        }

        assert_eq!(ticks, 60);
        assert!((simulated - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_driver_caps_long_frames() {
        let mut driver = FrameDriver::default();
        let ran = driver.advance(5.0, |_| {});

        // A 5 s stall is cut down to max_frame_time
        assert!((1..=2).contains(&ran));
        assert!(driver.clock().total_time() <= driver.config().max_frame_time + 1e-9);
    }

    #[test]
    fn test_driver_paused() {
        let mut driver = FrameDriver::default();
        driver.clock_mut().pause();
        assert_eq!(driver.advance(0.1, |_| {}), 0);
    }
}
