//! Binding entities to bodies in the physics world.

use glam::Vec3;
use log::{debug, warn};

use super::{BodyDesc, BodyHandle, PhysicsError, PhysicsWorld, ShapeKind};
use crate::entity::Entity;

/// A body owned by exactly one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Handle into the physics world.
    pub handle: BodyHandle,
    /// Collision shape the body was created with.
    pub shape: ShapeKind,
    /// Mass; zero marks a static body.
    pub mass: f32,
    /// Surface friction coefficient.
    pub friction: f32,
    /// Bounciness, from 0 to 1.
    pub restitution: f32,
}

impl RigidBody {
    /// Bodies with zero mass are immovable by impulses and forces.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

/// Creates a body for `entity` at its current transform and stores it on the
/// entity.
///
/// On [`PhysicsError::InvalidShape`] the entity is left untouched, so callers
/// can keep it as a purely visual node.
///
/// # Errors
/// Returns [`PhysicsError::InvalidMass`] for negative or non-finite masses and
/// whatever the world reports for the shape.
pub fn attach(
    world: &mut dyn PhysicsWorld,
    entity: &mut Entity,
    shape: ShapeKind,
    mass: f32,
    friction: f32,
    restitution: f32,
) -> Result<RigidBody, PhysicsError> {
    if !mass.is_finite() || mass < 0.0 {
        return Err(PhysicsError::InvalidMass(mass));
    }
    if !world.supports(&shape) {
        warn!(
            "shape {} unsupported, entity {} stays visual only",
            shape.name(),
            entity.name
        );
        return Err(PhysicsError::InvalidShape { shape: shape.name() });
    }
    if let Some(previous) = entity.body.take() {
        world.remove_body(previous.handle);
    }

    let handle = world.create_body(&BodyDesc {
        shape: shape.clone(),
        mass,
        friction,
        restitution,
        position: entity.position,
        rotation: entity.rotation,
        enabled: entity.enabled,
    })?;
    debug!(
        "attached {} body {handle:?} (mass {mass}) to {}",
        shape.name(),
        entity.name
    );
    let body = RigidBody {
        handle,
        shape,
        mass,
        friction,
        restitution,
    };
    entity.body = Some(body.clone());
    Ok(body)
}

/// Removes the entity's body from the world, if it has one.
pub fn detach(world: &mut dyn PhysicsWorld, entity: &mut Entity) -> bool {
    entity
        .body
        .take()
        .is_some_and(|body| world.remove_body(body.handle))
}

/// Overwrites velocity directly, bypassing force integration for the tick.
///
/// # Errors
/// Propagates [`PhysicsError::UnknownBody`] from the world.
pub fn set_velocity(
    world: &mut dyn PhysicsWorld,
    body: &RigidBody,
    linear: Option<Vec3>,
    angular: Option<Vec3>,
) -> Result<(), PhysicsError> {
    if let Some(v) = linear {
        world.set_linear_velocity(body.handle, v)?;
    }
    if let Some(w) = angular {
        world.set_angular_velocity(body.handle, w)?;
    }
    Ok(())
}

/// Injects momentum at a world-space point. No-op for static bodies.
///
/// # Errors
/// Propagates [`PhysicsError::UnknownBody`] from the world.
pub fn apply_impulse(
    world: &mut dyn PhysicsWorld,
    body: &RigidBody,
    impulse: Vec3,
    world_point: Vec3,
) -> Result<(), PhysicsError> {
    if body.is_static() {
        debug!("impulse on static body {:?} ignored", body.handle);
        return Ok(());
    }
    world.apply_impulse(body.handle, impulse, world_point)
}

/// Applies a force at a world-space point for the next step. No-op for
/// static bodies.
///
/// # Errors
/// Propagates [`PhysicsError::UnknownBody`] from the world.
pub fn apply_force(
    world: &mut dyn PhysicsWorld,
    body: &RigidBody,
    force: Vec3,
    world_point: Vec3,
) -> Result<(), PhysicsError> {
    if body.is_static() {
        debug!("force on static body {:?} ignored", body.handle);
        return Ok(());
    }
    world.apply_force(body.handle, force, world_point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use crate::physics::SandboxWorld;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    #[fixture]
    fn world() -> SandboxWorld {
        SandboxWorld::new(Vec3::ZERO)
    }

    fn entity(position: Vec3) -> Entity {
        Entity::new(EntityId(1), "crate", position)
    }

    #[rstest]
    fn attach_stores_body_on_entity(mut world: SandboxWorld) {
        let mut e = entity(Vec3::new(1.0, 2.0, 3.0));
        let body = attach(&mut world, &mut e, ShapeKind::cube(1.0), 10.0, 0.5, 0.7)
            .expect("box is supported");
        assert_eq!(e.body.as_ref(), Some(&body));
        let state = world.body(body.handle).expect("body exists");
        assert_eq!(state.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[rstest]
    fn unsupported_shape_leaves_entity_visual() {
        let mut world = SandboxWorld::default();
        let mut e = entity(Vec3::ZERO);
        let err = attach(
            &mut world,
            &mut e,
            ShapeKind::Mesh {
                vertices: vec![Vec3::ONE],
            },
            1.0,
            0.5,
            0.5,
        )
        .expect_err("sandbox rejects meshes");
        assert_eq!(err, PhysicsError::InvalidShape { shape: "mesh" });
        assert!(e.body.is_none());
    }

    #[rstest]
    fn negative_mass_is_rejected(mut world: SandboxWorld) {
        let mut e = entity(Vec3::ZERO);
        let err = attach(&mut world, &mut e, ShapeKind::cube(1.0), -1.0, 0.0, 0.0)
            .expect_err("negative mass");
        assert_eq!(err, PhysicsError::InvalidMass(-1.0));
    }

    #[rstest]
    #[case(Vec3::new(5.0, 0.0, 0.0))]
    #[case(Vec3::new(0.0, 1000.0, -3.0))]
    #[case(Vec3::new(-1e6, 1e6, 1e6))]
    fn static_bodies_ignore_impulse_and_force(mut world: SandboxWorld, #[case] push: Vec3) {
        let mut e = entity(Vec3::new(0.0, 0.5, 0.0));
        let body = attach(&mut world, &mut e, ShapeKind::cube(1.0), 0.0, 1.0, 1.0)
            .expect("box is supported");
        apply_impulse(&mut world, &body, push, e.position).expect("impulse");
        apply_force(&mut world, &body, push, e.position).expect("force");
        world.step(Duration::from_millis(16));
        let state = world.body(body.handle).expect("body exists");
        assert_eq!(state.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(state.linear_velocity, Vec3::ZERO);
    }

    #[rstest]
    fn set_velocity_overwrites_only_given_parts(mut world: SandboxWorld) {
        let mut e = entity(Vec3::ZERO);
        let body = attach(&mut world, &mut e, ShapeKind::cube(1.0), 1.0, 0.0, 0.0)
            .expect("box is supported");
        set_velocity(&mut world, &body, Some(Vec3::Y * 5.0), None).expect("linear");
        set_velocity(&mut world, &body, None, Some(Vec3::Y)).expect("angular");
        let state = world.body(body.handle).expect("body exists");
        assert_eq!(state.linear_velocity, Vec3::Y * 5.0);
        assert_eq!(state.angular_velocity, Vec3::Y);
    }

    #[rstest]
    fn detach_removes_body(mut world: SandboxWorld) {
        let mut e = entity(Vec3::ZERO);
        let body = attach(&mut world, &mut e, ShapeKind::ball(1.0), 1.0, 0.0, 0.0)
            .expect("sphere is supported");
        assert!(detach(&mut world, &mut e));
        assert!(world.body(body.handle).is_none());
        assert!(!detach(&mut world, &mut e));
    }
}
