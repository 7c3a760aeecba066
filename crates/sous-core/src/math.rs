//! Math utilities
//!
//! Re-exports from glam and the interpolation helpers the mini-games use to
//! smooth raw input toward its target.

use std::f64::consts::{PI, TAU};

pub use glam::DVec2;

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Inverse linear interpolation
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if (b - a).abs() < f64::EPSILON {
        0.0
    } else {
        (value - a) / (b - a)
    }
}

/// Remap a value from one range to another
pub fn remap(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    let t = inverse_lerp(from_min, from_max, value);
    lerp(to_min, to_max, t)
}

/// Smoothstep interpolation
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Wrap an angle into `(-PI, PI]`
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Lagged exponential approach of `current` toward `target`
///
/// Moves `rate * dt` of the remaining gap per call, never overshooting.
pub fn approach(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Clamp to `[0, 100]`, mapping NaN to zero
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

/// Critically damped follower for a scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothDamp {
    /// Current smoothed value
    pub value: f64,
    velocity: f64,
    /// Approximate time to reach the target
    pub smooth_time: f64,
}

impl SmoothDamp {
    /// Create a follower resting at `value`
    pub fn new(value: f64, smooth_time: f64) -> Self {
        Self {
            value,
            velocity: 0.0,
            smooth_time: smooth_time.max(1e-4),
        }
    }

    /// Step toward `target`, returning the new value
    pub fn update(&mut self, target: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return self.value;
        }
        let omega = 2.0 / self.smooth_time;
        let x = omega * dt;
        let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
        let change = self.value - target;
        let temp = (self.velocity + omega * change) * dt;
        self.velocity = (self.velocity - omega * temp) * decay;
        let mut next = target + (change + temp) * decay;

        // Never overshoot the target
        if (target - self.value > 0.0) == (next > target) {
            next = target;
            self.velocity = 0.0;
        }
        self.value = next;
        next
    }

    /// Jump to `value` with no residual motion
    pub fn snap(&mut self, value: f64) {
        self.value = value;
        self.velocity = 0.0;
    }
}

/// Critically damped follower for a 2-D position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothDamp2 {
    x: SmoothDamp,
    y: SmoothDamp,
}

impl SmoothDamp2 {
    /// Create a follower resting at `value`
    pub fn new(value: DVec2, smooth_time: f64) -> Self {
        Self {
            x: SmoothDamp::new(value.x, smooth_time),
            y: SmoothDamp::new(value.y, smooth_time),
        }
    }

    /// Current smoothed position
    pub fn value(&self) -> DVec2 {
        DVec2::new(self.x.value, self.y.value)
    }

    /// Step toward `target`, returning the new position
    pub fn update(&mut self, target: DVec2, dt: f64) -> DVec2 {
        DVec2::new(self.x.update(target.x, dt), self.y.update(target.y, dt))
    }

    /// Jump to `value` with no residual motion
    pub fn snap(&mut self, value: DVec2) {
        self.x.snap(value.x);
        self.y.snap(value.y);
    }
}
