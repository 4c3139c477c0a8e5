//! Float assertions for vectors.

use glam::Vec3;

/// Assert that `actual` lies within `epsilon` of `expected` on every axis.
///
/// # Panics
/// Panics naming the offending axis when any component is out of range.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use test_utils::assert_vec3_near;
/// assert_vec3_near(Vec3::new(0.1 + 0.2, 0.0, 1.0), Vec3::new(0.3, 0.0, 1.0), 1e-6);
/// ```
pub fn assert_vec3_near(actual: Vec3, expected: Vec3, epsilon: f32) {
    for (axis, a, e) in [
        ("x", actual.x, expected.x),
        ("y", actual.y, expected.y),
        ("z", actual.z, expected.z),
    ] {
        assert!(
            (a - e).abs() <= epsilon,
            "{axis}: expected {e}, got {a} (actual {actual}, expected {expected})"
        );
    }
}
