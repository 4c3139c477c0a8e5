//! A running controller session.
//!
//! [`Session`] owns the scene, the physics world, the camera and every
//! subsystem that acts on them. It starts not ready: until
//! [`Session::activate`] has loaded the actor's model and built its clip
//! catalog, [`Session::tick`] refuses to run.

mod tick;

use std::time::Duration;

use glam::Vec3;
use hashbrown::HashMap;
use log::info;
use thiserror::Error;

use crate::animation::{AnimationCatalog, AnimationError, AnimationEvent};
use crate::assets::{AssetLoadError, AssetLoader};
use crate::camera::{Camera, CameraFollow};
use crate::collision::{
    CollisionBus, CollisionMode, CommandQueue, ContactEvent, SubscriptionId,
};
use crate::config::SessionConfig;
use crate::entity::{Entity, EntityId};
use crate::input::{InputState, RawInput};
use crate::locomotion::LocomotionController;
use crate::numeric::millis;
use crate::physics::{BodyHandle, PhysicsError, PhysicsWorld, ShapeKind};
use crate::projectile::{ProjectileSpawner, SpawnContext};
use crate::scene::{Scene, SceneError};
use crate::timer::{TimerId, TimerQueue};
use crate::trigger::TriggerZone;

pub use tick::TickReport;

/// Failures surfaced by [`Session`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No actor has been activated yet.
    #[error("session is not ready; activate an actor first")]
    NotReady,
    /// No entity has this id.
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    /// A projectile template lacks a body.
    #[error("entity {0:?} has no rigid body and cannot be used as a template")]
    NotATemplate(EntityId),
    /// The operation needs a body the entity does not have.
    #[error("entity {0:?} has no rigid body")]
    NoBody(EntityId),
    /// The physics world refused the operation.
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    /// The actor model could not be loaded.
    #[error(transparent)]
    Asset(#[from] AssetLoadError),
    /// The actor model lacks a required clip.
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

impl From<SceneError> for SessionError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::UnknownEntity(id) => Self::UnknownEntity(id),
            SceneError::NotATemplate(id) => Self::NotATemplate(id),
            SceneError::Physics(e) => Self::Physics(e),
        }
    }
}

/// Templates cloned for each shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Templates {
    /// Thrown by the actor on primary fire.
    pub throwable: Option<EntityId>,
    /// Shot from the camera on secondary fire.
    pub shot: Option<EntityId>,
}

struct ActiveActor {
    id: EntityId,
    controller: LocomotionController,
    /// Clip events produced at activation, reported by the first tick.
    announced: Vec<AnimationEvent>,
}

/// Scene, physics and controller state for one actor.
pub struct Session {
    config: SessionConfig,
    physics: Box<dyn PhysicsWorld>,
    camera: Box<dyn Camera>,
    scene: Scene,
    bus: CollisionBus,
    commands: CommandQueue,
    input: InputState,
    pending_input: Vec<RawInput>,
    spawner: ProjectileSpawner,
    timers: TimerQueue<EntityId>,
    /// Pending `DisposeAfter` timer per entity.
    deferred: HashMap<EntityId, TimerId>,
    zones: Vec<TriggerZone>,
    follow: CameraFollow,
    templates: Templates,
    actor: Option<ActiveActor>,
    ticks: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("entities", &self.scene.len())
            .field("bus", &self.bus)
            .field("ready", &self.is_ready())
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// An empty, not-yet-ready session.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        physics: Box<dyn PhysicsWorld>,
        camera: Box<dyn Camera>,
    ) -> Self {
        let spawner = ProjectileSpawner::new(config.projectiles.clone());
        let follow = CameraFollow {
            enabled: config.camera_follow,
        };
        Self {
            config,
            physics,
            camera,
            scene: Scene::new(),
            bus: CollisionBus::new(),
            commands: CommandQueue::default(),
            input: InputState::new(),
            pending_input: Vec::new(),
            spawner,
            timers: TimerQueue::new(),
            deferred: HashMap::new(),
            zones: Vec::new(),
            follow,
            templates: Templates::default(),
            actor: None,
            ticks: 0,
        }
    }

    /// Configuration the session was built with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Tick length configured for hosts without their own clock.
    #[must_use]
    pub const fn frame_delta(&self) -> Duration {
        millis(self.config.frame_delta_ms)
    }

    /// Entities in the session.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for host-side setup.
    pub const fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The physics world.
    #[must_use]
    pub fn physics(&self) -> &dyn PhysicsWorld {
        self.physics.as_ref()
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &dyn Camera {
        self.camera.as_ref()
    }

    /// Whether an actor has been activated.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.actor.is_some()
    }

    /// The active actor entity.
    #[must_use]
    pub fn actor(&self) -> Option<&Entity> {
        self.actor.as_ref().and_then(|a| self.scene.get(a.id))
    }

    /// Current actor speed; zero before activation.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.actor.as_ref().map_or(0.0, |a| a.controller.speed())
    }

    /// Held actions and pending edges.
    #[must_use]
    pub const fn input(&self) -> &InputState {
        &self.input
    }

    /// Projectiles in flight.
    #[must_use]
    pub const fn projectiles(&self) -> &ProjectileSpawner {
        &self.spawner
    }

    /// Registered trigger zones.
    #[must_use]
    pub fn zones(&self) -> &[TriggerZone] {
        &self.zones
    }

    /// Adds a visual-only entity.
    pub fn spawn(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        self.scene.spawn(name, position)
    }

    /// Adds a disabled entity for use as a projectile template.
    pub fn spawn_template(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        self.scene.spawn_template(name, position)
    }

    /// Gives an entity a rigid body.
    ///
    /// # Errors
    /// Unknown entities and binding failures, see [`Scene::attach_body`].
    pub fn attach_body(
        &mut self,
        id: EntityId,
        shape: ShapeKind,
        mass: f32,
        friction: f32,
        restitution: f32,
    ) -> Result<BodyHandle, SessionError> {
        Ok(self
            .scene
            .attach_body(self.physics.as_mut(), id, shape, mass, friction, restitution)?)
    }

    fn require_body(&self, id: EntityId) -> Result<BodyHandle, SessionError> {
        if !self.scene.contains(id) {
            return Err(SessionError::UnknownEntity(id));
        }
        self.scene.body_of(id).ok_or(SessionError::NoBody(id))
    }

    /// Designates the entity whose contact starts projectile disposal.
    ///
    /// # Errors
    /// [`SessionError::UnknownEntity`] or [`SessionError::NoBody`].
    pub fn set_ground(&mut self, ground: EntityId) -> Result<(), SessionError> {
        let body = self.require_body(ground)?;
        self.spawner.set_ground(Some(body));
        Ok(())
    }

    /// # Errors
    /// [`SessionError::UnknownEntity`] for missing templates and
    /// [`SessionError::NotATemplate`] for templates without a body.
    pub fn set_templates(&mut self, templates: Templates) -> Result<(), SessionError> {
        for id in [templates.throwable, templates.shot].into_iter().flatten() {
            if !self.scene.contains(id) {
                return Err(SessionError::UnknownEntity(id));
            }
            if self.scene.body_of(id).is_none() {
                return Err(SessionError::NotATemplate(id));
            }
        }
        self.templates = templates;
        Ok(())
    }

    /// Tracks `tracked` against a box of `half_extents` centred on `zone`.
    ///
    /// # Errors
    /// [`SessionError::UnknownEntity`] if either entity is missing.
    pub fn add_trigger_zone(
        &mut self,
        zone: EntityId,
        tracked: EntityId,
        half_extents: Vec3,
    ) -> Result<(), SessionError> {
        for id in [zone, tracked] {
            if !self.scene.contains(id) {
                return Err(SessionError::UnknownEntity(id));
            }
        }
        self.zones.push(TriggerZone::new(zone, tracked, half_extents));
        Ok(())
    }

    /// Subscribes to contacts between two entities' bodies.
    ///
    /// # Errors
    /// [`SessionError::UnknownEntity`] or [`SessionError::NoBody`] for either
    /// side.
    pub fn on_collide<F>(
        &mut self,
        entity: EntityId,
        partners: &[EntityId],
        callback: F,
        mode: CollisionMode,
    ) -> Result<SubscriptionId, SessionError>
    where
        F: FnMut(&ContactEvent, &mut CommandQueue) -> anyhow::Result<()> + 'static,
    {
        let body = self.require_body(entity)?;
        let targets = partners
            .iter()
            .map(|p| self.require_body(*p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.bus.on_collide(body, targets, callback, mode))
    }

    /// Drops a subscription. Returns `false` if it was already gone.
    pub fn off_collide(&mut self, id: SubscriptionId) -> bool {
        self.bus.off_collide(id)
    }

    /// Queues a raw input event for the next tick.
    pub fn push_input(&mut self, raw: RawInput) {
        self.pending_input.push(raw);
    }

    /// Releases every action, e.g. when the host window loses focus.
    pub fn clear_input(&mut self) {
        self.pending_input.clear();
        self.input.clear();
    }

    /// Removes an entity now. Projectiles also lose their timers and
    /// subscriptions. Returns `false` if the entity was already gone.
    pub fn dispose(&mut self, id: EntityId) -> bool {
        if let Some(timer) = self.deferred.remove(&id) {
            self.timers.cancel(timer);
        }
        let mut ctx = SpawnContext {
            scene: &mut self.scene,
            physics: self.physics.as_mut(),
            bus: &mut self.bus,
        };
        if self.spawner.dispose(&mut ctx, id) {
            return true;
        }
        let handle = self.scene.body_of(id);
        if self.scene.dispose(self.physics.as_mut(), id).is_none() {
            return false;
        }
        if let Some(body) = handle {
            self.bus.off_body(body);
        }
        true
    }

    /// Number of collision subscriptions currently registered.
    #[must_use]
    pub fn subscriptions(&self) -> usize {
        self.bus.len()
    }

    /// Number of pending [`SceneCommand::DisposeAfter`] timers.
    ///
    /// [`SceneCommand::DisposeAfter`]: crate::collision::SceneCommand::DisposeAfter
    #[must_use]
    pub fn deferred_disposals(&self) -> usize {
        self.timers.len()
    }

    /// Loads the actor's model and makes the session ready.
    ///
    /// # Errors
    /// [`SessionError::UnknownEntity`] for a missing actor, loader failures
    /// and [`AnimationError::MissingClip`] when the model lacks a required
    /// clip. The session stays not ready on error.
    pub async fn activate<L: AssetLoader>(
        &mut self,
        loader: &L,
        model_path: &str,
        actor: EntityId,
    ) -> Result<(), SessionError> {
        if !self.scene.contains(actor) {
            return Err(SessionError::UnknownEntity(actor));
        }
        let model = loader.load_model(model_path).await?;
        let catalog = AnimationCatalog::from_loaded(&model.animations, &self.config.animations)?;
        let controller = LocomotionController::new(self.config.locomotion.clone(), catalog);
        let announced = controller.start();
        self.actor = Some(ActiveActor {
            id: actor,
            controller,
            announced,
        });
        info!("session ready with actor {actor:?} from {model_path}");
        Ok(())
    }
}
