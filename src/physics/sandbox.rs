//! Minimal in-memory solver standing in for the external physics engine.
//!
//! Integration is explicit Euler. Contacts are axis-aligned overlap tests on
//! the shapes' rest extents; only dynamic-versus-static pairs are resolved,
//! by pushing the dynamic body out along the vertical axis. That is enough to
//! drop balls on a floor and keep an actor standing, which is all the
//! controller needs from it.

use std::time::Duration;

use glam::{Quat, Vec3};
use hashbrown::HashMap;
use log::trace;

use super::{
    applied_acceleration, BodyDesc, BodyHandle, BodyState, ContactPair, PhysicsError,
    PhysicsWorld, ShapeKind,
};
use crate::constants::GRAVITY;
use crate::numeric::seconds_f32;

/// Vertical speeds below this after a bounce are treated as resting.
const REST_SPEED: f32 = 0.1;
/// Slack for contact detection so resting bodies keep reporting contact.
const CONTACT_SLOP: f32 = 1e-3;

#[derive(Debug, Clone)]
struct SandboxBody {
    shape: ShapeKind,
    mass: f32,
    friction: f32,
    restitution: f32,
    position: Vec3,
    rotation: Quat,
    linear: Vec3,
    angular: Vec3,
    force: Vec3,
    torque: Vec3,
    enabled: bool,
}

impl SandboxBody {
    fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    fn bounds(&self) -> (Vec3, Vec3) {
        let half = self.shape.half_extents();
        (self.position - half, self.position + half)
    }

    fn state(&self) -> BodyState {
        BodyState {
            position: self.position,
            rotation: self.rotation,
            linear_velocity: self.linear,
            angular_velocity: self.angular,
            mass: self.mass,
            enabled: self.enabled,
        }
    }

    fn integrate(&mut self, gravity: Vec3, dt: f32) {
        if let Some(acceleration) = applied_acceleration(self.force, self.mass) {
            self.linear += (gravity + acceleration) * dt;
            let inertia = self.shape.inertia(self.mass);
            if inertia > 0.0 {
                self.angular += self.torque / inertia * dt;
            }
        }
        // Static bodies only move when given a scripted velocity.
        self.position += self.linear * dt;
        let spin = self.angular * dt;
        if spin != Vec3::ZERO {
            self.rotation = (Quat::from_scaled_axis(spin) * self.rotation).normalize();
        }
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }
}

/// Reference solver used by tests and the demo binary.
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    gravity: Vec3,
    bodies: HashMap<BodyHandle, SandboxBody>,
    next_id: u64,
    contacts: Vec<ContactPair>,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new(Vec3::from_array(GRAVITY))
    }
}

fn overlaps(a: (Vec3, Vec3), b: (Vec3, Vec3)) -> bool {
    let (a_min, a_max) = a;
    let (b_min, b_max) = b;
    (a_min - CONTACT_SLOP).cmple(b_max).all() && (a_max + CONTACT_SLOP).cmpge(b_min).all()
}

impl SandboxWorld {
    /// An empty world pulling bodies with `gravity`.
    #[must_use]
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            bodies: HashMap::new(),
            next_id: 1,
            contacts: Vec::new(),
        }
    }

    /// Number of bodies currently in the world, enabled or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the world holds no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn get_mut(&mut self, body: BodyHandle) -> Result<&mut SandboxBody, PhysicsError> {
        self.bodies
            .get_mut(&body)
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn active_handles(&self) -> Vec<BodyHandle> {
        let mut handles: Vec<_> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.enabled)
            .map(|(&h, _)| h)
            .collect();
        handles.sort_unstable();
        handles
    }

    /// Pushes `dynamic` out of `fixed` vertically and bounces it.
    fn resolve(&mut self, dynamic: BodyHandle, fixed: BodyHandle) {
        let Some(support) = self.bodies.get(&fixed).cloned() else {
            return;
        };
        let Some(body) = self.bodies.get_mut(&dynamic) else {
            return;
        };
        let (support_min, support_max) = support.bounds();
        let half = body.shape.half_extents();
        if body.position.y >= support.position.y {
            body.position.y = body.position.y.max(support_max.y + half.y);
            if body.linear.y < 0.0 {
                body.linear.y = -body.linear.y * body.restitution * support.restitution;
            }
        } else {
            body.position.y = body.position.y.min(support_min.y - half.y);
            if body.linear.y > 0.0 {
                body.linear.y = -body.linear.y * body.restitution * support.restitution;
            }
        }
        if body.linear.y.abs() < REST_SPEED {
            body.linear.y = 0.0;
        }
        let grip = (1.0 - body.friction * support.friction * 0.1).clamp(0.0, 1.0);
        body.linear.x *= grip;
        body.linear.z *= grip;
    }

    fn detect_contacts(&mut self) {
        let handles = self.active_handles();
        let mut contacts = Vec::new();
        for (i, &first) in handles.iter().enumerate() {
            for &second in handles.iter().skip(i + 1) {
                let (Some(a), Some(b)) = (self.bodies.get(&first), self.bodies.get(&second))
                else {
                    continue;
                };
                if a.is_static() && b.is_static() {
                    continue;
                }
                if !overlaps(a.bounds(), b.bounds()) {
                    continue;
                }
                match (a.is_static(), b.is_static()) {
                    (true, false) => self.resolve(second, first),
                    (false, true) => self.resolve(first, second),
                    _ => {}
                }
                contacts.push(ContactPair::new(first, second));
            }
        }
        trace!("sandbox step produced {} contacts", contacts.len());
        self.contacts = contacts;
    }
}

impl PhysicsWorld for SandboxWorld {
    fn supports(&self, shape: &ShapeKind) -> bool {
        !matches!(shape, ShapeKind::Mesh { .. })
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        if !self.supports(&desc.shape) {
            return Err(PhysicsError::InvalidShape {
                shape: desc.shape.name(),
            });
        }
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            handle,
            SandboxBody {
                shape: desc.shape.clone(),
                mass: desc.mass,
                friction: desc.friction,
                restitution: desc.restitution,
                position: desc.position,
                rotation: desc.rotation,
                linear: Vec3::ZERO,
                angular: Vec3::ZERO,
                force: Vec3::ZERO,
                torque: Vec3::ZERO,
                enabled: desc.enabled,
            },
        );
        Ok(handle)
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        self.contacts.retain(|c| c.other(body).is_none());
        self.bodies.remove(&body).is_some()
    }

    fn set_enabled(&mut self, body: BodyHandle, enabled: bool) -> Result<(), PhysicsError> {
        self.get_mut(body)?.enabled = enabled;
        Ok(())
    }

    fn body(&self, body: BodyHandle) -> Option<BodyState> {
        self.bodies.get(&body).map(SandboxBody::state)
    }

    fn set_transform(
        &mut self,
        body: BodyHandle,
        position: Vec3,
        rotation: Quat,
    ) -> Result<(), PhysicsError> {
        let b = self.get_mut(body)?;
        b.position = position;
        b.rotation = rotation;
        Ok(())
    }

    fn set_linear_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        self.get_mut(body)?.linear = velocity;
        Ok(())
    }

    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        self.get_mut(body)?.angular = velocity;
        Ok(())
    }

    fn apply_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vec3,
        world_point: Vec3,
    ) -> Result<(), PhysicsError> {
        let b = self.get_mut(body)?;
        let Some(delta_v) = applied_acceleration(impulse, b.mass) else {
            return Ok(());
        };
        b.linear += delta_v;
        let inertia = b.shape.inertia(b.mass);
        if inertia > 0.0 {
            b.angular += (world_point - b.position).cross(impulse) / inertia;
        }
        Ok(())
    }

    fn apply_force(
        &mut self,
        body: BodyHandle,
        force: Vec3,
        world_point: Vec3,
    ) -> Result<(), PhysicsError> {
        let b = self.get_mut(body)?;
        if b.is_static() {
            return Ok(());
        }
        b.force += force;
        b.torque += (world_point - b.position).cross(force);
        Ok(())
    }

    fn step(&mut self, dt: Duration) {
        let seconds = seconds_f32(dt);
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.enabled) {
            body.integrate(gravity, seconds);
        }
        self.detect_contacts();
    }

    fn report_contacts(&self) -> Vec<ContactPair> {
        self.contacts.clone()
    }
}
