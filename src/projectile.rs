//! Spawning, launching and disposing of projectiles.
//!
//! A projectile is a clone of a disabled template entity. Once launched it
//! subscribes to contacts with the ground; the first contact schedules its
//! disposal. Bounces re-arm the subscription, so the spawner itself guards
//! against scheduling a second disposal for the same projectile.

use std::time::Duration;

use glam::{Quat, Vec3};
use hashbrown::HashMap;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionBus, CollisionMode, SceneCommand, SubscriptionId};
use crate::constants::{
    DISPOSAL_DELAY_MS, HANDED_SPAWN_OFFSET, HANDED_YAW_WINDOW, SHOT_IMPULSE, THROW_IMPULSE,
};
use crate::entity::EntityId;
use crate::numeric::millis;
use crate::physics::{self, BodyHandle, PhysicsWorld};
use crate::scene::{Scene, SceneError};
use crate::timer::{TimerId, TimerQueue};
use crate::vector_math::{vec_normalize, yaw_of};

/// Where a new projectile appears relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPlacement {
    /// Beside the actor, on the side picked from its heading.
    Handed,
    /// Exactly at the origin, e.g. the camera.
    AtOrigin,
}

impl SpawnPlacement {
    /// World-space spawn position for an origin pose.
    ///
    /// The handed offset is applied in world axes: one branch when the origin
    /// yaw lies strictly inside the handed window, the mirrored x/z branch
    /// otherwise.
    #[must_use]
    pub fn position(self, origin: Vec3, rotation: Quat) -> Vec3 {
        match self {
            Self::AtOrigin => origin,
            Self::Handed => {
                let [x, y, z] = HANDED_SPAWN_OFFSET;
                let (lower, upper) = HANDED_YAW_WINDOW;
                let yaw = yaw_of(rotation);
                let offset = if yaw > lower && yaw < upper {
                    Vec3::new(x, y, z)
                } else {
                    Vec3::new(-x, y, -z)
                };
                origin + offset
            }
        }
    }
}

/// How the launch vector is handed to the solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Launch {
    /// One instantaneous impulse.
    #[default]
    Impulse,
    /// Continuous force for the first step only.
    Force,
}

/// Projectile tuning shared by every shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Delay between first ground contact and disposal.
    pub disposal_delay_ms: u64,
    /// Upper bound on a projectile's life when it never lands.
    pub max_lifetime_ms: Option<u64>,
    /// Launch magnitude for thrown projectiles.
    pub throw_impulse: f32,
    /// Launch magnitude for shots.
    pub shot_impulse: f32,
    /// How the launch vector is applied.
    pub launch: Launch,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            disposal_delay_ms: DISPOSAL_DELAY_MS,
            max_lifetime_ms: None,
            throw_impulse: THROW_IMPULSE,
            shot_impulse: SHOT_IMPULSE,
            launch: Launch::Impulse,
        }
    }
}

/// One firing request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    /// Position of the shooter or camera.
    pub origin: Vec3,
    /// Orientation of the shooter or camera.
    pub origin_rotation: Quat,
    /// Launch direction; normalised before use.
    pub direction: Vec3,
    /// Launch impulse or force magnitude.
    pub magnitude: f32,
    /// Where the projectile appears.
    pub placement: SpawnPlacement,
}

/// Mutable session parts the spawner works on.
pub struct SpawnContext<'a> {
    /// Entities.
    pub scene: &'a mut Scene,
    /// Solver owning the bodies.
    pub physics: &'a mut dyn PhysicsWorld,
    /// Contact subscriptions.
    pub bus: &'a mut CollisionBus,
}

#[derive(Debug, Clone, Copy, Default)]
struct Projectile {
    subscription: Option<SubscriptionId>,
    disposal: Option<TimerId>,
    lifetime: Option<TimerId>,
}

/// Tracks live projectiles and their pending disposals.
#[derive(Debug)]
pub struct ProjectileSpawner {
    config: ProjectileConfig,
    ground: Option<BodyHandle>,
    timers: TimerQueue<EntityId>,
    live: HashMap<EntityId, Projectile>,
}

impl ProjectileSpawner {
    /// A spawner with nothing in flight and no ground set.
    #[must_use]
    pub fn new(config: ProjectileConfig) -> Self {
        Self {
            config,
            ground: None,
            timers: TimerQueue::new(),
            live: HashMap::new(),
        }
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    /// Sets the body whose contact starts the disposal countdown.
    pub const fn set_ground(&mut self, ground: Option<BodyHandle>) {
        self.ground = ground;
    }

    /// Clones `template`, places and enables the clone, launches it and
    /// subscribes it to ground contact. Returns the new projectile's id.
    ///
    /// # Errors
    /// Scene errors for a missing or bodiless template, and physics errors
    /// from placing or launching the clone.
    pub fn fire(
        &mut self,
        ctx: &mut SpawnContext<'_>,
        template: EntityId,
        shot: &Shot,
    ) -> Result<EntityId, SceneError> {
        let id = ctx.scene.clone_entity(ctx.physics, template)?;
        let position = shot.placement.position(shot.origin, shot.origin_rotation);
        let entity = ctx
            .scene
            .get_mut(id)
            .ok_or(SceneError::UnknownEntity(id))?;
        entity.position = position;
        entity.rotation = Quat::IDENTITY;
        entity.enabled = true;
        let body = entity.body.clone().ok_or(SceneError::NotATemplate(template))?;

        ctx.physics
            .set_transform(body.handle, position, Quat::IDENTITY)?;
        ctx.physics.set_enabled(body.handle, true)?;

        let launch = vec_normalize(shot.direction) * shot.magnitude;
        if launch == Vec3::ZERO {
            warn!("projectile {id:?} fired with a degenerate direction");
        }
        match self.config.launch {
            Launch::Impulse => physics::apply_impulse(ctx.physics, &body, launch, position)?,
            Launch::Force => physics::apply_force(ctx.physics, &body, launch, position)?,
        }

        let mut projectile = Projectile::default();
        if let Some(ground) = self.ground {
            let sub = ctx.bus.on_collide(
                body.handle,
                ground,
                move |_, commands| {
                    commands.push(SceneCommand::ScheduleDisposal(id));
                    Ok(())
                },
                CollisionMode::PerContact,
            );
            projectile.subscription = Some(sub);
        }
        if let Some(limit) = self.config.max_lifetime_ms {
            projectile.lifetime = Some(self.timers.schedule(millis(limit), id));
        }
        self.live.insert(id, projectile);
        info!("fired projectile {id:?} from {template:?} at {position}");
        Ok(id)
    }

    /// Starts the disposal countdown for a live projectile. Returns `false`
    /// if the projectile is unknown or already counting down.
    pub fn schedule_disposal(&mut self, id: EntityId) -> bool {
        let Some(projectile) = self.live.get_mut(&id) else {
            return false;
        };
        if projectile.disposal.is_some() {
            return false;
        }
        let delay = millis(self.config.disposal_delay_ms);
        projectile.disposal = Some(self.timers.schedule(delay, id));
        debug!("projectile {id:?} disposes in {delay:?}");
        true
    }

    /// Whether `id` has a pending disposal timer.
    #[must_use]
    pub fn disposal_pending(&self, id: EntityId) -> bool {
        self.live
            .get(&id)
            .and_then(|p| p.disposal)
            .is_some_and(|timer| self.timers.is_pending(timer))
    }

    /// Number of pending timers, disposals and lifetimes alike.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Removes a projectile immediately, cancelling its timers and every
    /// subscription on its body. Disposing twice is a no-op returning `false`.
    pub fn dispose(&mut self, ctx: &mut SpawnContext<'_>, id: EntityId) -> bool {
        let Some(projectile) = self.live.remove(&id) else {
            return false;
        };
        for timer in [projectile.disposal, projectile.lifetime].into_iter().flatten() {
            self.timers.cancel(timer);
        }
        if let Some(handle) = ctx.scene.body_of(id) {
            let dropped = ctx.bus.off_body(handle);
            trace!("dropped {dropped} subscriptions on {handle:?}");
        } else if let Some(sub) = projectile.subscription {
            ctx.bus.off_collide(sub);
        }
        ctx.scene.dispose(ctx.physics, id);
        true
    }

    /// Advances the disposal clock, disposing whatever came due.
    pub fn advance(&mut self, ctx: &mut SpawnContext<'_>, dt: Duration) -> Vec<EntityId> {
        let due = self.timers.advance(dt);
        due.into_iter()
            .filter_map(|(_, id)| self.dispose(ctx, id).then_some(id))
            .collect()
    }

    /// Whether `id` is a projectile this spawner still owns.
    #[must_use]
    pub fn is_live(&self, id: EntityId) -> bool {
        self.live.contains_key(&id)
    }

    /// Live projectiles in id order.
    #[must_use]
    pub fn live(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.live.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
