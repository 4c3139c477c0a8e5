//! Camera abstraction and actor follow behaviour.
use glam::Vec3;
use log::trace;

use crate::entity::Entity;
use crate::vector_math::vec_normalize;

/// The host's scene camera.
pub trait Camera {
    /// World-space eye position.
    fn position(&self) -> Vec3;
    /// Point the camera looks at.
    fn target(&self) -> Vec3;
    /// Repoints the camera at `target`.
    fn set_target(&mut self, target: Vec3);
    /// Unit vector from the camera towards what it looks at.
    fn forward_direction(&self) -> Vec3;
}

/// Orbiting camera held at a fixed offset from its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Point the camera orbits and looks at.
    pub target: Vec3,
    /// Camera position relative to the target.
    pub offset: Vec3,
}

impl OrbitCamera {
    /// Camera at `target + offset`, looking at `target`.
    #[must_use]
    pub const fn new(target: Vec3, offset: Vec3) -> Self {
        Self { target, offset }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::new(0.0, 5.0, -10.0))
    }
}

impl Camera for OrbitCamera {
    fn position(&self) -> Vec3 {
        self.target + self.offset
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn forward_direction(&self) -> Vec3 {
        vec_normalize(-self.offset)
    }
}

/// Keeps the camera target over the actor without changing its height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraFollow {
    /// When `false`, [`CameraFollow::update`] leaves the camera alone.
    pub enabled: bool,
}

impl Default for CameraFollow {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CameraFollow {
    /// Copies the actor's x and z into the camera target.
    pub fn update(&self, camera: &mut dyn Camera, actor: &Entity) {
        if !self.enabled {
            return;
        }
        let current = camera.target();
        let next = Vec3::new(actor.position.x, current.y, actor.position.z);
        if next != current {
            trace!("camera target {current} -> {next}");
            camera.set_target(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use rstest::rstest;

    #[rstest]
    fn follow_tracks_ground_plane_only() {
        let mut camera = OrbitCamera::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 5.0, -10.0));
        let actor = Entity::new(EntityId(1), "actor", Vec3::new(3.0, 7.0, -4.0));
        CameraFollow::default().update(&mut camera, &actor);
        assert_eq!(camera.target(), Vec3::new(3.0, 2.0, -4.0));
        assert_eq!(camera.position(), Vec3::new(3.0, 7.0, -14.0));
    }

    #[rstest]
    fn disabled_follow_leaves_camera() {
        let mut camera = OrbitCamera::default();
        let actor = Entity::new(EntityId(1), "actor", Vec3::ONE);
        CameraFollow { enabled: false }.update(&mut camera, &actor);
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[rstest]
    fn forward_points_from_camera_to_target() {
        let camera = OrbitCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(camera.forward_direction(), Vec3::Z);
    }
}
