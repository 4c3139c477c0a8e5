//! Scene-graph nodes driven by the controller.
use glam::{Quat, Vec3};
use serde::Serialize;

use crate::physics::RigidBody;

/// Entity identifier with type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub u64);

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl EntityId {
    /// Raw numeric id.
    #[must_use]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

/// A positioned node, optionally backed by a rigid body.
///
/// Disabled entities are inert templates: they are neither simulated nor
/// rendered until a clone of them is enabled.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Scene-unique id.
    pub id: EntityId,
    /// Display name; not required to be unique.
    pub name: String,
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub rotation: Quat,
    /// Disabled entities are skipped by the simulation.
    pub enabled: bool,
    /// Attached rigid body, if any.
    pub body: Option<RigidBody>,
}

impl Entity {
    /// An enabled, bodiless entity at `position`.
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            rotation: Quat::IDENTITY,
            enabled: true,
            body: None,
        }
    }

    /// Whether the entity carries a body with positive mass.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_static())
    }

    /// Half extents used by geometric overlap tests.
    ///
    /// Entities without a body are treated as points.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.body
            .as_ref()
            .map_or(Vec3::ZERO, |b| b.shape.half_extents())
    }
}
