//! Integration tests for the animation module.

use std::time::Duration;

use proptest::prelude::*;
use spotlight_core::animation::*;

#[test]
fn monotonic_curves_are_monotonic() {
    for easing in [linear, ease_in, ease_out, ease_in_out, accelerate_decelerate] {
        let mut prev = 0.0f32;
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let v = easing(t);
            assert!(v >= prev - 0.001, "easing should be monotonic at t={}", t);
            prev = v;
        }
    }
}

#[test]
fn pulse_track_peaks_mid_cycle() {
    let track = Track::new(Keyframes::new([1.0, 1.08, 1.0]), Duration::from_millis(900))
        .easing(accelerate_decelerate)
        .loop_count(LoopCount::Infinite);
    let peak = (0..900)
        .map(|ms| track.value_at(Duration::from_millis(ms)))
        .fold(f32::MIN, f32::max);
    assert!((peak - 1.08).abs() < 1e-3);
    assert!((track.value_at(Duration::from_millis(1800)) - 1.0).abs() < 1e-5);
}

proptest! {
    #[test]
    fn track_values_stay_within_keyframe_range(
        values in prop::collection::vec(-10.0f32..10.0, 1..6),
        duration_ms in 1u64..5_000,
        elapsed_ms in 0u64..20_000,
        infinite in any::<bool>(),
    ) {
        let keyframes = Keyframes::new(values);
        let (lo, hi) = (keyframes.min(), keyframes.max());
        let track = Track::new(keyframes, Duration::from_millis(duration_ms))
            .easing(ease_in_out)
            .loop_count(if infinite { LoopCount::Infinite } else { LoopCount::Once });
        let v = track.value_at(Duration::from_millis(elapsed_ms));
        prop_assert!(v >= lo - 1e-4 && v <= hi + 1e-4, "{v} outside [{lo}, {hi}]");
    }

    #[test]
    fn once_track_completes_exactly_at_duration(duration_ms in 1u64..10_000) {
        let duration = Duration::from_millis(duration_ms);
        let track = Track::tween(3.0, 7.0, duration);
        prop_assert!(!track.is_complete(duration - Duration::from_nanos(1)));
        prop_assert!(track.is_complete(duration));
        prop_assert_eq!(track.value_at(duration), 7.0);
    }
}
