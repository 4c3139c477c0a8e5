//! Numeric conversion helpers used across the project.
//!
//! Speeds are accumulated in `f64` so repeated acceleration steps land on
//! their cap exactly; transforms are `f32`. These helpers guard the crossing
//! and the conversion of configured millisecond delays.

use std::time::Duration;

/// Convert a finite `f64` into `f32`, asserting that it fits the target type.
#[expect(
    clippy::cast_possible_truncation,
    reason = "Callers assert that the value fits within f32 bounds."
)]
#[must_use]
pub fn expect_f32(value: f64) -> f32 {
    debug_assert!(value.is_finite(), "expected finite f64 for f32 conversion");
    debug_assert!(
        value <= f64::from(f32::MAX),
        "f64 value {value} exceeds f32::MAX"
    );
    debug_assert!(
        value >= f64::from(f32::MIN),
        "f64 value {value} is below f32::MIN"
    );
    value as f32
}

/// Convert a duration into fractional seconds as `f32` for integration steps.
#[must_use]
pub fn seconds_f32(duration: Duration) -> f32 {
    expect_f32(duration.as_secs_f64())
}

/// Milliseconds to [`Duration`] for configured delays.
///
/// # Examples
/// ```
/// use playfield::numeric::millis;
/// assert_eq!(millis(1600).as_millis(), 1600);
/// ```
#[must_use]
pub const fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_millis(16), 0.016)]
    #[case(Duration::from_secs(3), 3.0)]
    #[case(Duration::ZERO, 0.0)]
    fn seconds_conversion(#[case] input: Duration, #[case] expected: f32) {
        assert_relative_eq!(seconds_f32(input), expected);
    }

    #[rstest]
    fn expect_f32_keeps_small_values() {
        assert_relative_eq!(expect_f32(0.25), 0.25_f32);
    }
}
