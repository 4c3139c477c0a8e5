//! The per-tick pipeline.
//!
//! Order: raw input, physics step, entity sync, collision dispatch, timers,
//! queued commands, locomotion and firing, camera follow, trigger zones.

use std::time::Duration;

use glam::{Quat, Vec3};
use log::{debug, error, trace, warn};

use super::{ActiveActor, Session, SessionError};
use crate::animation::AnimationEvent;
use crate::collision::{DispatchReport, SceneCommand};
use crate::entity::EntityId;
use crate::input::InputFrame;
use crate::locomotion::LocomotionEvent;
use crate::physics;
use crate::projectile::{Shot, SpawnContext, SpawnPlacement};
use crate::trigger::TriggerEvent;

/// What happened during one [`Session::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// One-based tick counter.
    pub tick: u64,
    /// Contact pairs the physics world reported this tick.
    pub contacts: usize,
    /// Collision callback outcomes.
    pub dispatch: DispatchReport,
    /// Projectiles spawned this tick.
    pub fired: Vec<EntityId>,
    /// Entities removed by timers or commands this tick.
    pub disposed: Vec<EntityId>,
    /// Clip changes, in order.
    pub animations: Vec<AnimationEvent>,
    /// Trigger zone transitions.
    pub triggers: Vec<TriggerEvent>,
    /// Actor speed after locomotion ran.
    pub speed: f64,
}

impl Session {
    /// Runs one tick of `dt` simulated time.
    ///
    /// # Errors
    /// [`SessionError::NotReady`] before activation,
    /// [`SessionError::UnknownEntity`] if the actor was disposed, and physics
    /// errors from writing the actor's transform. Failed shots are logged
    /// and skipped.
    pub fn tick(&mut self, dt: Duration) -> Result<TickReport, SessionError> {
        let mut active = self.actor.take().ok_or(SessionError::NotReady)?;
        let result = self.run_tick(&mut active, dt);
        self.actor = Some(active);
        result
    }

    fn run_tick(
        &mut self,
        active: &mut ActiveActor,
        dt: Duration,
    ) -> Result<TickReport, SessionError> {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };
        report.animations.append(&mut active.announced);

        let frame = self.drain_input();

        self.physics.step(dt);
        self.scene.sync_from_bodies(self.physics.as_ref());

        let contacts = self.physics.report_contacts();
        report.contacts = contacts.len();
        report.dispatch = self.bus.dispatch(&contacts, &mut self.commands);
        // Timers queued by this tick's contacts start counting next tick.
        self.advance_timers(dt, &mut report);
        self.apply_commands(&mut report);

        self.drive_actor(active, &frame, dt, &mut report)?;
        if frame.edges.secondary_fire {
            self.fire_shot(&mut report);
        }

        if let Some(actor) = self.scene.get(active.id) {
            self.follow.update(self.camera.as_mut(), actor);
        }
        for zone in &mut self.zones {
            report.triggers.extend(zone.update(&self.scene));
        }

        report.speed = active.controller.speed();
        trace!("tick {} done: {report:?}", report.tick);
        Ok(report)
    }

    fn drain_input(&mut self) -> InputFrame {
        for raw in std::mem::take(&mut self.pending_input) {
            self.input.apply(&raw, &self.config.bindings);
        }
        self.input.take_frame()
    }

    fn apply_commands(&mut self, report: &mut TickReport) {
        let commands: Vec<_> = self.commands.drain().collect();
        for command in commands {
            match command {
                SceneCommand::ScheduleDisposal(id) => {
                    if !self.spawner.schedule_disposal(id) {
                        trace!("disposal for {id:?} already scheduled or not a projectile");
                    }
                }
                SceneCommand::DisposeAfter { entity, delay } => {
                    let timer = self.timers.schedule(delay, entity);
                    if let Some(stale) = self.deferred.insert(entity, timer) {
                        self.timers.cancel(stale);
                    }
                }
                SceneCommand::Dispose(id) => {
                    if self.dispose(id) {
                        report.disposed.push(id);
                    }
                }
                SceneCommand::Unsubscribe(sub) => {
                    self.bus.off_collide(sub);
                }
            }
        }
    }

    fn advance_timers(&mut self, dt: Duration, report: &mut TickReport) {
        let mut ctx = SpawnContext {
            scene: &mut self.scene,
            physics: self.physics.as_mut(),
            bus: &mut self.bus,
        };
        report.disposed.extend(self.spawner.advance(&mut ctx, dt));
        for (_, id) in self.timers.advance(dt) {
            if self.dispose(id) {
                report.disposed.push(id);
            }
        }
    }

    fn drive_actor(
        &mut self,
        active: &mut ActiveActor,
        frame: &InputFrame,
        dt: Duration,
        report: &mut TickReport,
    ) -> Result<(), SessionError> {
        let actor = self
            .scene
            .get_mut(active.id)
            .ok_or(SessionError::UnknownEntity(active.id))?;
        let outcome = active.controller.update(frame, actor, dt);
        let (position, rotation, actor_body) =
            (actor.position, actor.rotation, actor.body.clone());
        if let Some(body) = &actor_body {
            self.physics.set_transform(body.handle, position, rotation)?;
        }
        report.animations.extend(outcome.animations);

        for event in outcome.events {
            match event {
                LocomotionEvent::ThrowStarted => debug!("throw started"),
                LocomotionEvent::ThrowReleased => self.fire_throw(position, rotation, report),
                LocomotionEvent::JumpStarted => match &actor_body {
                    Some(body) => {
                        let impulse = Vec3::Y * active.controller.config().jump_impulse;
                        physics::apply_impulse(self.physics.as_mut(), body, impulse, position)?;
                    }
                    None => debug!("actor has no body; jump is animation only"),
                },
            }
        }
        Ok(())
    }

    fn fire_throw(&mut self, origin: Vec3, rotation: Quat, report: &mut TickReport) {
        let shot = Shot {
            origin,
            origin_rotation: rotation,
            direction: self.camera.forward_direction(),
            magnitude: self.config.projectiles.throw_impulse,
            placement: SpawnPlacement::Handed,
        };
        self.fire("throwable", self.templates.throwable, &shot, report);
    }

    fn fire_shot(&mut self, report: &mut TickReport) {
        let shot = Shot {
            origin: self.camera.position(),
            origin_rotation: Quat::IDENTITY,
            direction: self.camera.forward_direction(),
            magnitude: self.config.projectiles.shot_impulse,
            placement: SpawnPlacement::AtOrigin,
        };
        self.fire("shot", self.templates.shot, &shot, report);
    }

    fn fire(
        &mut self,
        role: &str,
        template: Option<EntityId>,
        shot: &Shot,
        report: &mut TickReport,
    ) {
        let Some(template) = template else {
            warn!("no {role} template configured; shot skipped");
            return;
        };
        let mut ctx = SpawnContext {
            scene: &mut self.scene,
            physics: self.physics.as_mut(),
            bus: &mut self.bus,
        };
        match self.spawner.fire(&mut ctx, template, shot) {
            Ok(id) => report.fired.push(id),
            Err(e) => error!("{role} shot from {template:?} failed: {e}"),
        }
    }
}
