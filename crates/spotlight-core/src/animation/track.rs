#![forbid(unsafe_code)]

//! Keyframe tracks.
//!
//! A [`Track`] samples evenly spaced [`Keyframes`] through an easing curve:
//! the curve is applied to the cycle fraction first, then the eased fraction
//! is interpolated across the keyframes. `Track::new(Keyframes::new([1.0,
//! 1.08, 1.0]), 900ms)` therefore rises to 1.08 at the midpoint and returns.
//!
//! # Failure Modes
//!
//! - Zero duration: clamped to 1ns to avoid division by zero.
//! - Empty keyframes: treated as a constant 0.0.
//! - Non-finite keyframes are kept as-is; callers own their inputs.

use std::time::Duration;

use super::{EasingFn, linear};

/// How many times to repeat a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoopCount {
    /// Play once (no looping).
    Once,
    /// Repeat a fixed number of times (total plays = times + 1).
    Times(u32),
    /// Loop forever.
    Infinite,
}

/// Evenly spaced values sampled by normalized progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    values: Vec<f32>,
}

impl Keyframes {
    /// Create keyframes from a list of values.
    #[must_use]
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let mut values = values.into();
        if values.is_empty() {
            values.push(0.0);
        }
        Self { values }
    }

    /// A two-value tween.
    #[must_use]
    pub fn between(from: f32, to: f32) -> Self {
        Self::new([from, to])
    }

    /// The keyframe values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn first(&self) -> f32 {
        self.values[0]
    }

    pub fn last(&self) -> f32 {
        self.values[self.values.len() - 1]
    }

    /// Smallest keyframe value.
    pub fn min(&self) -> f32 {
        self.values.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Largest keyframe value.
    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Interpolate at `fraction` in [0.0, 1.0] (clamped).
    pub fn sample(&self, fraction: f32) -> f32 {
        let segments = self.values.len() - 1;
        if segments == 0 {
            return self.values[0];
        }
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let position = fraction * segments as f32;
        let index = (position.floor() as usize).min(segments - 1);
        let local = position - index as f32;
        let (a, b) = (self.values[index], self.values[index + 1]);
        a + (b - a) * local
    }
}

/// Keyframes played over a duration with an easing curve and loop count.
#[derive(Debug, Clone)]
pub struct Track {
    keyframes: Keyframes,
    duration: Duration,
    easing: EasingFn,
    loop_count: LoopCount,
}

impl Track {
    /// Play `keyframes` once over `duration` with linear easing.
    #[must_use]
    pub fn new(keyframes: Keyframes, duration: Duration) -> Self {
        Self {
            keyframes,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
            loop_count: LoopCount::Once,
        }
    }

    /// A single `from → to` tween.
    #[must_use]
    pub fn tween(from: f32, to: f32, duration: Duration) -> Self {
        Self::new(Keyframes::between(from, to), duration)
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Set the loop count (builder pattern).
    #[must_use]
    pub fn loop_count(mut self, count: LoopCount) -> Self {
        self.loop_count = count;
        self
    }

    /// Duration of one cycle.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Total play time, or `None` for infinite tracks.
    pub fn total_duration(&self) -> Option<Duration> {
        match self.loop_count {
            LoopCount::Once => Some(self.duration),
            LoopCount::Times(n) => Some(self.duration.saturating_mul(n.saturating_add(1))),
            LoopCount::Infinite => None,
        }
    }

    pub fn keyframes(&self) -> &Keyframes {
        &self.keyframes
    }

    /// Value at `elapsed` time since the track started.
    pub fn value_at(&self, elapsed: Duration) -> f32 {
        if self.is_complete(elapsed) {
            return self.keyframes.sample((self.easing)(1.0));
        }
        let cycles = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let fraction = match self.loop_count {
            LoopCount::Once => cycles.min(1.0),
            LoopCount::Times(_) | LoopCount::Infinite => cycles.fract(),
        };
        self.keyframes.sample((self.easing)(fraction as f32))
    }

    /// Whether the track has played out at `elapsed`.
    pub fn is_complete(&self, elapsed: Duration) -> bool {
        self.total_duration().is_some_and(|total| elapsed >= total)
    }
}
