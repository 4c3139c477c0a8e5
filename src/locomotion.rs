//! Input-driven motion and clip selection for a controlled actor.
//!
//! Each tick the controller turns the held movement flags into a speed and a
//! heading change, writes the resulting transform to the actor entity, and
//! picks which clip should play. Speed ramps up while forward or backward is
//! held and drops to zero the moment both are released.

use std::time::Duration;

use glam::Vec3;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationCatalog, AnimationEvent, ClipKind};
use crate::constants::{
    ACCELERATION, BACKWARD_FACTOR, JUMP_AIRTIME_MS, JUMP_IMPULSE, MAX_JUMP_HEIGHT, MAX_SPEED,
    THROW_RELEASE_DELAY_MS, TURN_STEP,
};
use crate::entity::Entity;
use crate::input::{InputFrame, MovementFlags};
use crate::numeric::{expect_f32, millis};
use crate::vector_math::{local_forward, rotate_about_up};

/// Per-actor tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Speed gained per tick while moving.
    pub acceleration: f64,
    /// Forward speed ceiling.
    pub max_speed: f64,
    /// Multiplier applied to speed when moving backward.
    pub backward_factor: f64,
    /// Heading change per tick while turning, in radians.
    pub turn_step: f32,
    /// Time from the start of the throw clip to the projectile's release.
    pub throw_release_delay_ms: u64,
    /// Total length of the jump then fall clips.
    pub jump_airtime_ms: u64,
    /// Upward velocity given to an embodied actor on jump.
    pub jump_impulse: f32,
    /// Jumps are refused above this height.
    pub max_jump_height: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            acceleration: ACCELERATION,
            max_speed: MAX_SPEED,
            backward_factor: BACKWARD_FACTOR,
            turn_step: TURN_STEP,
            throw_release_delay_ms: THROW_RELEASE_DELAY_MS,
            jump_airtime_ms: JUMP_AIRTIME_MS,
            jump_impulse: JUMP_IMPULSE,
            max_jump_height: MAX_JUMP_HEIGHT,
        }
    }
}

/// Discrete motion states. Linear and turning states combine freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    /// No movement action held.
    Idle,
    /// Walking forward.
    MovingForward,
    /// Walking backward at reduced speed.
    MovingBackward,
    /// Turning counter-clockwise.
    TurningLeft,
    /// Turning clockwise.
    TurningRight,
}

impl LocomotionState {
    /// Every state active for the given flags; `[Idle]` when none.
    #[must_use]
    pub fn from_flags(flags: MovementFlags) -> Vec<Self> {
        let mut states = Vec::new();
        if flags.backward {
            states.push(Self::MovingBackward);
        } else if flags.forward {
            states.push(Self::MovingForward);
        }
        match (flags.left, flags.right) {
            (true, false) => states.push(Self::TurningLeft),
            (false, true) => states.push(Self::TurningRight),
            _ => {}
        }
        if states.is_empty() {
            states.push(Self::Idle);
        }
        states
    }

    const fn clip(self) -> ClipKind {
        match self {
            Self::Idle => ClipKind::Idle,
            Self::MovingForward => ClipKind::WalkForward,
            Self::MovingBackward => ClipKind::WalkBackward,
            Self::TurningLeft => ClipKind::TurnLeft,
            Self::TurningRight => ClipKind::TurnRight,
        }
    }
}

/// Something the session must act on after a controller tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionEvent {
    /// The throw clip began playing.
    ThrowStarted,
    /// The throw clip reached its release pose; spawn the projectile now.
    ThrowReleased,
    /// Apply the jump impulse to the actor's body.
    JumpStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActionClip {
    kind: ClipKind,
    remaining: Duration,
}

/// Result of one [`LocomotionController::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// World-space translation applied this tick.
    pub translation: Vec3,
    /// Heading change applied this tick, in radians.
    pub yaw_delta: f32,
    /// Clip changes, in the order they happened.
    pub animations: Vec<AnimationEvent>,
    /// Actions the session must carry out.
    pub events: Vec<LocomotionEvent>,
}

/// Speed/heading model and clip selector for one actor.
#[derive(Debug, Clone)]
pub struct LocomotionController {
    config: LocomotionConfig,
    catalog: AnimationCatalog,
    speed: f64,
    locomotion_clip: ClipKind,
    action_clip: Option<ActionClip>,
}

impl LocomotionController {
    /// A stationary controller playing idle.
    #[must_use]
    pub fn new(config: LocomotionConfig, catalog: AnimationCatalog) -> Self {
        Self {
            config,
            catalog,
            speed: 0.0,
            locomotion_clip: ClipKind::Idle,
            action_clip: None,
        }
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Current scalar speed.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// The looping locomotion clip currently selected.
    #[must_use]
    pub const fn locomotion_clip(&self) -> ClipKind {
        self.locomotion_clip
    }

    /// The one-shot clip playing over locomotion, if any.
    #[must_use]
    pub fn action_clip(&self) -> Option<ClipKind> {
        self.action_clip.map(|a| a.kind)
    }

    /// Clip events announcing the initial idle clip.
    #[must_use]
    pub fn start(&self) -> Vec<AnimationEvent> {
        self.play(self.locomotion_clip).into_iter().collect()
    }

    fn play(&self, kind: ClipKind) -> Option<AnimationEvent> {
        self.catalog.get(kind).map(|clip| AnimationEvent::Play {
            kind,
            clip: clip.clone(),
        })
    }

    fn stop(&self, kind: ClipKind) -> Option<AnimationEvent> {
        self.catalog.get(kind).map(|clip| AnimationEvent::Stop {
            kind,
            clip: clip.clone(),
        })
    }

    fn update_speed(&mut self, flags: MovementFlags) {
        if flags.linear() {
            if self.speed < self.config.max_speed {
                self.speed = (self.speed + self.config.acceleration).min(self.config.max_speed);
            }
        } else {
            self.speed = 0.0;
        }
    }

    /// Signed travel along the local forward axis for this tick.
    fn travel(&self, flags: MovementFlags) -> f32 {
        // Backward wins when both are held.
        if flags.backward {
            -expect_f32(self.speed * self.config.backward_factor)
        } else if flags.forward {
            expect_f32(self.speed)
        } else {
            0.0
        }
    }

    fn yaw_delta(&self, flags: MovementFlags) -> f32 {
        let mut delta = 0.0;
        if flags.left {
            delta += self.config.turn_step;
        }
        if flags.right {
            delta -= self.config.turn_step;
        }
        delta
    }

    fn select_locomotion_clip(&mut self, flags: MovementFlags, out: &mut Vec<AnimationEvent>) {
        let next = LocomotionState::from_flags(flags)
            .first()
            .map_or(ClipKind::Idle, |s| s.clip());
        if next == self.locomotion_clip {
            return;
        }
        trace!("locomotion clip {:?} -> {next:?}", self.locomotion_clip);
        out.extend(self.stop(self.locomotion_clip));
        out.extend(self.play(next));
        self.locomotion_clip = next;
    }

    fn start_action(&mut self, kind: ClipKind, length: Duration, out: &mut Vec<AnimationEvent>) {
        self.action_clip = Some(ActionClip {
            kind,
            remaining: length,
        });
        out.extend(self.play(kind));
    }

    /// Counts down the running action clip, chaining jump into fall.
    fn advance_action(
        &mut self,
        dt: Duration,
        animations: &mut Vec<AnimationEvent>,
        events: &mut Vec<LocomotionEvent>,
    ) {
        let Some(mut action) = self.action_clip else {
            return;
        };
        action.remaining = action.remaining.saturating_sub(dt);
        if !action.remaining.is_zero() {
            self.action_clip = Some(action);
            return;
        }
        self.action_clip = None;
        animations.extend(self.stop(action.kind));
        match action.kind {
            ClipKind::Throw => events.push(LocomotionEvent::ThrowReleased),
            ClipKind::Jump => {
                let fall = millis(self.config.jump_airtime_ms) / 2;
                self.start_action(ClipKind::Fall, fall, animations);
            }
            _ => {}
        }
    }

    fn handle_edges(
        &mut self,
        frame: &InputFrame,
        actor: &Entity,
        animations: &mut Vec<AnimationEvent>,
        events: &mut Vec<LocomotionEvent>,
    ) {
        // One-shot clips do not interrupt each other.
        if self.action_clip.is_some() {
            if frame.edges.primary_fire || frame.edges.jump {
                debug!("action edge ignored while {:?} plays", self.action_clip());
            }
            return;
        }
        if frame.edges.primary_fire {
            let delay = millis(self.config.throw_release_delay_ms);
            self.start_action(ClipKind::Throw, delay, animations);
            events.push(LocomotionEvent::ThrowStarted);
            if delay.is_zero() {
                self.action_clip = None;
                animations.extend(self.stop(ClipKind::Throw));
                events.push(LocomotionEvent::ThrowReleased);
            }
        } else if frame.edges.jump {
            if actor.position.y > self.config.max_jump_height {
                debug!("jump refused at height {}", actor.position.y);
                return;
            }
            let rise = millis(self.config.jump_airtime_ms) / 2;
            self.start_action(ClipKind::Jump, rise, animations);
            events.push(LocomotionEvent::JumpStarted);
        }
    }

    /// Advances one tick: updates speed and heading, moves `actor`, and
    /// reports clip changes and requests for the session.
    pub fn update(&mut self, frame: &InputFrame, actor: &mut Entity, dt: Duration) -> TickOutcome {
        let flags = frame.movement;
        let mut animations = Vec::new();
        let mut events = Vec::new();

        self.update_speed(flags);

        let yaw_delta = self.yaw_delta(flags);
        if yaw_delta != 0.0 {
            actor.rotation = rotate_about_up(actor.rotation, yaw_delta);
        }
        let translation = local_forward(actor.rotation) * self.travel(flags);
        actor.position += translation;

        self.advance_action(dt, &mut animations, &mut events);
        self.handle_edges(frame, actor, &mut animations, &mut events);
        self.select_locomotion_clip(flags, &mut animations);

        TickOutcome {
            translation,
            yaw_delta,
            animations,
            events,
        }
    }
}
