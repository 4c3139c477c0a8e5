//! Heading, yaw and direction helpers shared by locomotion and spawning.
use glam::{EulerRot, Quat, Vec3};

/// Local forward axis of every controlled entity.
pub const LOCAL_FORWARD: Vec3 = Vec3::Z;

/// Returns the unit vector in the direction of `vector`.
///
/// Non-finite input and the zero vector both yield [`Vec3::ZERO`], so a
/// degenerate launch direction produces no impulse rather than `NaN`s.
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use playfield::vec_normalize;
/// let n = vec_normalize(Vec3::new(3.0, 0.0, 4.0));
/// assert!((n.x - 0.6).abs() < 1e-6);
/// assert!((n.z - 0.8).abs() < 1e-6);
///
/// assert_eq!(vec_normalize(Vec3::ZERO), Vec3::ZERO);
/// ```
#[must_use]
pub fn vec_normalize(vector: Vec3) -> Vec3 {
    if !vector.is_finite() {
        return Vec3::ZERO;
    }
    vector.try_normalize().unwrap_or(Vec3::ZERO)
}

/// Heading angle about world up, in `(-π, π]`.
///
/// # Examples
/// ```
/// use glam::Quat;
/// use playfield::vector_math::yaw_of;
/// let yaw = yaw_of(Quat::from_rotation_y(0.5));
/// assert!((yaw - 0.5).abs() < 1e-6);
/// ```
#[must_use]
pub fn yaw_of(rotation: Quat) -> f32 {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    yaw
}

/// The entity's forward axis expressed in world space.
#[must_use]
pub fn local_forward(rotation: Quat) -> Vec3 {
    rotation * LOCAL_FORWARD
}

/// Rotates `rotation` about world up by `angle` radians.
#[must_use]
pub fn rotate_about_up(rotation: Quat, angle: f32) -> Quat {
    (Quat::from_rotation_y(angle) * rotation).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[rstest]
    #[case(0.0)]
    #[case(0.3)]
    #[case(-2.0)]
    #[case(PI)]
    fn yaw_round_trips_through_quaternion(#[case] angle: f32) {
        let yaw = yaw_of(Quat::from_rotation_y(angle));
        assert_relative_eq!(yaw.sin(), angle.sin(), epsilon = 1e-5);
        assert_relative_eq!(yaw.cos(), angle.cos(), epsilon = 1e-5);
    }

    #[rstest]
    fn forward_follows_heading() {
        let forward = local_forward(Quat::from_rotation_y(FRAC_PI_2));
        assert_relative_eq!(forward.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-6);
    }

    #[rstest]
    fn nan_direction_normalises_to_zero() {
        assert_eq!(vec_normalize(Vec3::new(f32::NAN, 1.0, 0.0)), Vec3::ZERO);
    }
}
