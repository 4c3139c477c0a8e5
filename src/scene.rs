//! Entity registry for a running session.
//!
//! The scene owns every [`Entity`] and keeps the reverse map from physics
//! bodies back to the entities that carry them, so contact pairs can be
//! resolved to scene nodes.

use glam::Vec3;
use hashbrown::HashMap;
use log::{debug, trace};
use thiserror::Error;

use crate::entity::{Entity, EntityId};
use crate::physics::{self, BodyHandle, PhysicsError, PhysicsWorld, ShapeKind};

/// Failures of scene graph operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// No entity has this id.
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    /// Projectile templates must carry a body to launch.
    #[error("entity {0:?} has no rigid body and cannot be used as a template")]
    NotATemplate(EntityId),
    /// The physics world refused the operation.
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// All entities in a session, keyed by id.
#[derive(Debug, Default)]
pub struct Scene {
    entities: HashMap<EntityId, Entity>,
    bodies: HashMap<BodyHandle, EntityId>,
    next_id: u64,
}

impl Scene {
    /// An empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    /// Adds a visual-only entity and returns its id.
    pub fn spawn(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        let id = self.allocate();
        let entity = Entity::new(id, name, position);
        trace!("spawned {} as {id:?}", entity.name);
        self.entities.insert(id, entity);
        id
    }

    /// Adds a disabled entity, the usual shape of a projectile template.
    pub fn spawn_template(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        let id = self.spawn(name, position);
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.enabled = false;
        }
        id
    }

    /// Entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable entity by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Whether `id` is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of entities, templates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// First entity with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        let mut ids: Vec<_> = self
            .entities
            .values()
            .filter(|e| e.name == name)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids.first().copied()
    }

    /// Entity carrying `body`, if any.
    #[must_use]
    pub fn entity_for_body(&self, body: BodyHandle) -> Option<EntityId> {
        self.bodies.get(&body).copied()
    }

    /// Body handle of an entity, if it carries one.
    #[must_use]
    pub fn body_of(&self, id: EntityId) -> Option<BodyHandle> {
        self.get(id).and_then(|e| e.body.as_ref()).map(|b| b.handle)
    }

    /// Entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        let mut all: Vec<_> = self.entities.values().collect();
        all.sort_unstable_by_key(|e| e.id);
        all.into_iter()
    }

    /// Binds a new rigid body to `id`.
    ///
    /// # Errors
    /// [`SceneError::UnknownEntity`] for a missing entity; binding failures
    /// are wrapped in [`SceneError::Physics`].
    pub fn attach_body(
        &mut self,
        world: &mut dyn PhysicsWorld,
        id: EntityId,
        shape: ShapeKind,
        mass: f32,
        friction: f32,
        restitution: f32,
    ) -> Result<BodyHandle, SceneError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(SceneError::UnknownEntity(id))?;
        if let Some(previous) = entity.body.as_ref() {
            self.bodies.remove(&previous.handle);
        }
        let body = physics::attach(world, entity, shape, mass, friction, restitution)?;
        self.bodies.insert(body.handle, id);
        Ok(body.handle)
    }

    /// Clones `template` under a fresh id, including a new body with the same
    /// shape and material. The clone keeps the template's enabled flag.
    ///
    /// # Errors
    /// [`SceneError::UnknownEntity`] when the template is missing and
    /// [`SceneError::NotATemplate`] when it has no body.
    pub fn clone_entity(
        &mut self,
        world: &mut dyn PhysicsWorld,
        template: EntityId,
    ) -> Result<EntityId, SceneError> {
        let source = self
            .entities
            .get(&template)
            .cloned()
            .ok_or(SceneError::UnknownEntity(template))?;
        let body = source
            .body
            .clone()
            .ok_or(SceneError::NotATemplate(template))?;
        let id = self.allocate();
        let mut clone = Entity {
            id,
            name: format!("{}#{}", source.name, id.into_inner()),
            body: None,
            ..source
        };
        let bound = physics::attach(
            world,
            &mut clone,
            body.shape,
            body.mass,
            body.friction,
            body.restitution,
        )?;
        debug!("cloned {template:?} into {id:?}");
        self.bodies.insert(bound.handle, id);
        self.entities.insert(id, clone);
        Ok(id)
    }

    /// Removes an entity and its body. Returns `None` if it was already gone.
    pub fn dispose(&mut self, world: &mut dyn PhysicsWorld, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(&id)?;
        if let Some(body) = entity.body.as_ref() {
            self.bodies.remove(&body.handle);
        }
        physics::detach(world, &mut entity);
        debug!("disposed {} ({id:?})", entity.name);
        Some(entity)
    }

    /// Copies body transforms reported by the world onto enabled entities.
    pub fn sync_from_bodies(&mut self, world: &dyn PhysicsWorld) {
        for entity in self.entities.values_mut().filter(|e| e.enabled) {
            let Some(body) = entity.body.as_ref() else {
                continue;
            };
            if let Some(state) = world.body(body.handle) {
                entity.position = state.position;
                entity.rotation = state.rotation;
            }
        }
    }
}
