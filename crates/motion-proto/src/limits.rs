//! Numeric bounds and fixed names shared by the dispatcher and the bridge.
//!
//! Intensity and speed are always clamped into their closed ranges before
//! they reach the wire. Out-of-range input is never rejected.

use std::time::Duration;

/// Lowest intensity the native view accepts.
pub const INTENSITY_MIN: f64 = 0.0;

/// Highest intensity the native view accepts.
pub const INTENSITY_MAX: f64 = 1.0;

/// Slowest playback speed multiplier.
pub const SPEED_MIN: f64 = 0.1;

/// Fastest playback speed multiplier.
pub const SPEED_MAX: f64 = 3.0;

/// Commands admitted per [`RATE_LIMIT_WINDOW`].
pub const RATE_LIMIT_MAX_MESSAGES: usize = 30;

/// Length of the sliding rate-limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(1);

/// Native game object that receives every outbound message.
pub const UNITY_GAME_OBJECT: &str = "MotionController";

/// Method invoked on [`UNITY_GAME_OBJECT`].
pub const UNITY_METHOD: &str = "OnExpoMessage";

/// Number of session-token characters that may appear in debug logs.
pub const TOKEN_LOG_PREFIX: usize = 8;

/// Clamp an intensity into `[INTENSITY_MIN, INTENSITY_MAX]`.
///
/// NaN maps to the lower bound.
pub fn clamp_intensity(value: f64) -> f64 {
    clamp_closed(value, INTENSITY_MIN, INTENSITY_MAX)
}

/// Clamp a speed multiplier into `[SPEED_MIN, SPEED_MAX]`.
///
/// NaN maps to the lower bound.
pub fn clamp_speed(value: f64) -> f64 {
    clamp_closed(value, SPEED_MIN, SPEED_MAX)
}

fn clamp_closed(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn in_range_values_pass_through() {
        assert!((clamp_intensity(0.5) - 0.5).abs() < f64::EPSILON);
        assert!((clamp_speed(1.25) - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_clamps_to_lower_bound() {
        assert!((clamp_intensity(f64::NAN) - INTENSITY_MIN).abs() < f64::EPSILON);
        assert!((clamp_speed(f64::NAN) - SPEED_MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn infinities_clamp_to_bounds() {
        assert!((clamp_intensity(f64::INFINITY) - INTENSITY_MAX).abs() < f64::EPSILON);
        assert!((clamp_speed(f64::NEG_INFINITY) - SPEED_MIN).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn intensity_always_within_bounds(value in any::<f64>()) {
            let clamped = clamp_intensity(value);
            prop_assert!((INTENSITY_MIN..=INTENSITY_MAX).contains(&clamped));
        }

        #[test]
        fn speed_above_range_is_upper_bound(value in SPEED_MAX..1.0e9f64) {
            prop_assert_eq!(clamp_speed(value).to_bits(), SPEED_MAX.to_bits());
        }

        #[test]
        fn speed_below_range_is_lower_bound(value in -1.0e9f64..SPEED_MIN) {
            prop_assert_eq!(clamp_speed(value).to_bits(), SPEED_MIN.to_bits());
        }
    }
}
