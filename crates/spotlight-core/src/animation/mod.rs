#![forbid(unsafe_code)]

//! Animation primitives: easing curves, keyframe tracks, and the animator.
//!
//! A [`Track`] is pure: it maps elapsed time to a value and never touches a
//! clock. The [`Animator`] plays a track through a
//! [`Scheduler`](crate::scheduler::Scheduler), invoking a per-frame callback
//! and a completion callback.
//!
//! # Invariants
//!
//! 1. Easing functions map 0.0 to 0.0 and 1.0 to 1.0.
//! 2. `Track::value_at` is deterministic given elapsed time.
//! 3. A cancelled or dropped [`AnimationHandle`] never invokes its callbacks
//!    again.

mod animator;
mod track;

pub use animator::{AnimationHandle, Animator, FRAME_INTERVAL};
pub use track::{Keyframes, LoopCount, Track};

/// An easing curve over normalized time.
pub type EasingFn = fn(f32) -> f32;

/// Identity curve.
#[inline]
pub fn linear(t: f32) -> f32 {
    t
}

/// Quadratic ease-in.
#[inline]
pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Quadratic ease-out.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u / 2.0
    }
}

/// Cosine curve that starts and ends slowly.
#[inline]
pub fn accelerate_decelerate(t: f32) -> f32 {
    ((t + 1.0) * std::f32::consts::PI).cos() / 2.0 + 0.5
}

/// Falls to 1.0 and bounces three times with shrinking height.
pub fn bounce(t: f32) -> f32 {
    fn arc(t: f32) -> f32 {
        t * t * 8.0
    }
    let t = t * 1.1226;
    if t < 0.3535 {
        arc(t)
    } else if t < 0.7408 {
        arc(t - 0.54719) + 0.7
    } else if t < 0.9644 {
        arc(t - 0.8526) + 0.9
    } else {
        arc(t - 1.0435) + 0.95
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [(&str, EasingFn); 6] = [
        ("linear", linear),
        ("ease_in", ease_in),
        ("ease_out", ease_out),
        ("ease_in_out", ease_in_out),
        ("accelerate_decelerate", accelerate_decelerate),
        ("bounce", bounce),
    ];

    #[test]
    fn curves_pin_endpoints() {
        for (name, curve) in CURVES {
            assert!(curve(0.0).abs() < 1e-3, "{name}(0) = {}", curve(0.0));
            assert!((curve(1.0) - 1.0).abs() < 1e-3, "{name}(1) = {}", curve(1.0));
        }
    }

    #[test]
    fn accelerate_decelerate_is_symmetric() {
        assert!((accelerate_decelerate(0.5) - 0.5).abs() < 1e-6);
        let a = accelerate_decelerate(0.2);
        let b = 1.0 - accelerate_decelerate(0.8);
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn bounce_stays_in_unit_range() {
        for i in 0..=200 {
            let t = i as f32 / 200.0;
            let v = bounce(t);
            assert!((-1e-3..=1.0 + 1e-3).contains(&v), "bounce({t}) = {v}");
        }
    }
}
