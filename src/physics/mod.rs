//! Rigid-body plumbing between scene entities and an external solver.
//!
//! The solver itself lives behind [`PhysicsWorld`]; this crate never
//! integrates motion for real scenes. [`SandboxWorld`] is a
//! small stand-in used by tests and the headless demo.

mod binding;
mod sandbox;

use std::time::Duration;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use binding::{apply_force, apply_impulse, attach, detach, set_velocity, RigidBody};
pub use sandbox::SandboxWorld;

/// Smallest acceptable mass to avoid numerically unstable accelerations.
const MIN_MASS: f32 = 1e-6;

/// Opaque handle to a body owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BodyHandle(pub u64);

/// Collision shape of a rigid body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Axis-aligned box in body space.
    Box {
        /// Half the edge length along each axis.
        half_extents: Vec3,
    },
    /// Sphere centred on the body origin.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },
    /// Upright cylinder centred on the body origin.
    Cylinder {
        /// Radius of the circular cross-section.
        radius: f32,
        /// Half the height along the up axis.
        half_height: f32,
    },
    /// Convex hull over arbitrary vertices. Not every world supports it.
    Mesh {
        /// Hull vertices in body space.
        vertices: Vec<Vec3>,
    },
}

impl ShapeKind {
    /// Cube with edge length `size`.
    #[must_use]
    pub const fn cube(size: f32) -> Self {
        Self::Box {
            half_extents: Vec3::splat(size * 0.5),
        }
    }

    /// Sphere with the given diameter, matching how the demos size balls.
    #[must_use]
    pub const fn ball(diameter: f32) -> Self {
        Self::Sphere {
            radius: diameter * 0.5,
        }
    }

    /// Short name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Mesh { .. } => "mesh",
        }
    }

    /// Half extents of the axis-aligned box bounding the shape at rest.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        match self {
            Self::Box { half_extents } => half_extents.abs(),
            Self::Sphere { radius } => Vec3::splat(radius.abs()),
            Self::Cylinder {
                radius,
                half_height,
            } => Vec3::new(radius.abs(), half_height.abs(), radius.abs()),
            Self::Mesh { vertices } => vertices
                .iter()
                .fold(Vec3::ZERO, |acc, v| acc.max(v.abs())),
        }
    }

    /// Scalar moment of inertia approximation about the centre of mass.
    #[must_use]
    pub fn inertia(&self, mass: f32) -> f32 {
        let extents = self.half_extents();
        match self {
            Self::Sphere { radius } => 0.4 * mass * radius * radius,
            Self::Cylinder { radius, .. } => 0.5 * mass * radius * radius,
            Self::Box { .. } | Self::Mesh { .. } => {
                let size = extents * 2.0;
                mass * (size.x * size.x + size.y * size.y + size.z * size.z) / 12.0
            }
        }
    }
}

/// Everything the physics world needs to create a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    /// Collision shape.
    pub shape: ShapeKind,
    /// Mass; zero creates a static body.
    pub mass: f32,
    /// Surface friction coefficient.
    pub friction: f32,
    /// Bounciness, from 0 to 1.
    pub restitution: f32,
    /// Initial world position.
    pub position: Vec3,
    /// Initial world orientation.
    pub rotation: Quat,
    /// Whether the body starts simulated.
    pub enabled: bool,
}

/// Snapshot of a body as reported by the physics world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub rotation: Quat,
    /// Linear velocity in world units per second.
    pub linear_velocity: Vec3,
    /// Angular velocity in radians per second.
    pub angular_velocity: Vec3,
    /// Mass; zero for static bodies.
    pub mass: f32,
    /// Whether the body is simulated.
    pub enabled: bool,
}

/// Two bodies the solver found touching after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactPair {
    /// The lower of the two handles.
    pub a: BodyHandle,
    /// The higher of the two handles.
    pub b: BodyHandle,
}

impl ContactPair {
    /// Builds a pair with a canonical ordering so `(a, b)` and `(b, a)`
    /// compare equal.
    #[must_use]
    pub fn new(first: BodyHandle, second: BodyHandle) -> Self {
        if first <= second {
            Self {
                a: first,
                b: second,
            }
        } else {
            Self {
                a: second,
                b: first,
            }
        }
    }

    /// Returns the partner of `body` if the pair involves it.
    #[must_use]
    pub fn other(&self, body: BodyHandle) -> Option<BodyHandle> {
        if self.a == body {
            Some(self.b)
        } else if self.b == body {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Failures surfaced by the physics world or the binding layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// The world cannot build this shape.
    #[error("shape `{shape}` is not supported by the active physics world")]
    InvalidShape {
        /// Name of the rejected shape.
        shape: &'static str,
    },
    /// Mass was negative, NaN or infinite.
    #[error("mass {0} is not a finite, non-negative value")]
    InvalidMass(f32),
    /// The handle does not name a live body.
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),
}

/// The external rigid-body solver.
///
/// Implementations own integration and contact detection. Impulses and
/// forces applied to bodies with zero mass must leave them in place.
pub trait PhysicsWorld {
    /// Whether [`PhysicsWorld::create_body`] accepts this shape.
    fn supports(&self, shape: &ShapeKind) -> bool;
    /// Creates a body and returns its handle.
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError>;
    /// Removes a body; returns `false` when it was already gone.
    fn remove_body(&mut self, body: BodyHandle) -> bool;
    /// Disabled bodies neither move nor report contacts.
    fn set_enabled(&mut self, body: BodyHandle, enabled: bool) -> Result<(), PhysicsError>;
    /// Current state of a body, or `None` when unknown.
    fn body(&self, body: BodyHandle) -> Option<BodyState>;
    /// Teleports a body.
    fn set_transform(
        &mut self,
        body: BodyHandle,
        position: Vec3,
        rotation: Quat,
    ) -> Result<(), PhysicsError>;
    /// Overwrites a body's linear velocity.
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3)
        -> Result<(), PhysicsError>;
    /// Overwrites a body's angular velocity.
    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), PhysicsError>;
    /// Applies an instantaneous impulse at `world_point`.
    fn apply_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vec3,
        world_point: Vec3,
    ) -> Result<(), PhysicsError>;
    /// Applies a force at `world_point` for the next step.
    fn apply_force(
        &mut self,
        body: BodyHandle,
        force: Vec3,
        world_point: Vec3,
    ) -> Result<(), PhysicsError>;
    /// Advances the simulation by `dt`.
    fn step(&mut self, dt: Duration);
    /// Contact pairs found by the most recent [`PhysicsWorld::step`].
    fn report_contacts(&self) -> Vec<ContactPair>;
}

/// Computes acceleration from a force vector and mass.
///
/// Returns `None` if `mass` is non-positive or effectively zero (see
/// [`MIN_MASS`]): static bodies do not accelerate.
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use playfield::applied_acceleration;
/// let a = applied_acceleration(Vec3::new(7.0, -14.0, 21.0), 7.0).unwrap();
/// assert!((a.x - 1.0).abs() < 1e-6);
/// assert!((a.y + 2.0).abs() < 1e-6);
/// assert!((a.z - 3.0).abs() < 1e-6);
/// assert!(applied_acceleration(Vec3::X, 0.0).is_none());
/// ```
#[must_use]
pub fn applied_acceleration(force: Vec3, mass: f32) -> Option<Vec3> {
    (mass > MIN_MASS).then(|| force / mass)
}
