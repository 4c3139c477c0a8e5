//! Ready-made sessions for integration tests.

use std::future::Future;
use std::time::Duration;

use glam::Vec3;
use playfield::{
    ClipKind, EntityId, LoadedModel, MemoryLoader, OrbitCamera, RawInput, SandboxWorld, Session,
    SessionConfig, ShapeKind, Templates, TickReport,
};

/// Path under which [`model_loader`] serves [`full_model`].
pub const MODEL_PATH: &str = "actor.glb";

/// A model carrying every clip under its default name.
///
/// # Examples
/// ```
/// let model = test_utils::full_model();
/// assert!(model.animations.iter().any(|a| a == "throw"));
/// ```
pub fn full_model() -> LoadedModel {
    LoadedModel {
        meshes: vec!["actor".to_owned()],
        animations: ClipKind::ALL
            .iter()
            .map(|kind| kind.default_name().to_owned())
            .collect(),
    }
}

/// Loader serving [`full_model`] at [`MODEL_PATH`].
pub fn model_loader() -> MemoryLoader {
    MemoryLoader::new().with_model(MODEL_PATH, full_model())
}

/// Run a future to completion on a fresh single-threaded runtime.
///
/// # Panics
/// Panics if the runtime cannot be built.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime")
        .block_on(future)
}

/// An activated session with a ground slab, two projectile templates, an
/// actor at the origin and a goal zone five units ahead of it.
pub struct Rig {
    pub session: Session,
    pub actor: EntityId,
    pub ground: EntityId,
    pub ball: EntityId,
    pub cannonball: EntityId,
    pub goal: EntityId,
    pub dt: Duration,
}

impl Rig {
    /// Builds the rig with gravity switched off, so spawn positions and
    /// launch velocities can be read back unchanged.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_gravity(config, Vec3::ZERO)
    }

    /// # Panics
    /// Panics if any part of the scene cannot be built or activated.
    pub fn with_gravity(config: SessionConfig, gravity: Vec3) -> Self {
        let mut session = Session::new(
            config,
            Box::new(SandboxWorld::new(gravity)),
            Box::new(OrbitCamera::new(Vec3::ZERO, Vec3::new(0.0, 5.0, -10.0))),
        );
        let ground = session.spawn("ground", Vec3::new(0.0, -0.5, 0.0));
        session
            .attach_body(
                ground,
                ShapeKind::Box {
                    half_extents: Vec3::new(50.0, 0.5, 50.0),
                },
                0.0,
                0.8,
                0.3,
            )
            .expect("ground body");
        session.set_ground(ground).expect("ground");

        let ball = session.spawn_template("bowlingBall", Vec3::new(0.0, -10.0, 0.0));
        session
            .attach_body(ball, ShapeKind::ball(0.3), 1.0, 0.5, 0.5)
            .expect("ball body");
        let cannonball = session.spawn_template("cannonball", Vec3::new(0.0, -10.0, 0.0));
        session
            .attach_body(cannonball, ShapeKind::ball(0.5), 1.0, 0.5, 0.2)
            .expect("cannonball body");
        session
            .set_templates(Templates {
                throwable: Some(ball),
                shot: Some(cannonball),
            })
            .expect("templates");

        let actor = session.spawn("actor", Vec3::ZERO);
        let goal = session.spawn("goal", Vec3::new(0.0, 0.0, 5.0));
        session
            .add_trigger_zone(goal, actor, Vec3::ONE)
            .expect("goal zone");

        block_on(session.activate(&model_loader(), MODEL_PATH, actor)).expect("activate");
        let dt = session.frame_delta();
        Self {
            session,
            actor,
            ground,
            ball,
            cannonball,
            goal,
            dt,
        }
    }

    pub fn hold(&mut self, code: &str) {
        self.session.push_input(RawInput::KeyDown(code.to_owned()));
    }

    pub fn release(&mut self, code: &str) {
        self.session.push_input(RawInput::KeyUp(code.to_owned()));
    }

    /// Press and release within one tick.
    pub fn tap(&mut self, code: &str) {
        self.hold(code);
        self.release(code);
    }

    pub fn click(&mut self, button: u8) {
        self.session.push_input(RawInput::PointerDown(button));
        self.session.push_input(RawInput::PointerUp(button));
    }

    /// # Panics
    /// Panics if the tick fails.
    pub fn step(&mut self) -> TickReport {
        self.session.tick(self.dt).expect("tick")
    }

    pub fn run(&mut self, ticks: usize) -> Vec<TickReport> {
        (0..ticks).map(|_| self.step()).collect()
    }

    /// # Panics
    /// Panics if the actor has been removed.
    pub fn actor_position(&self) -> Vec3 {
        self.session.actor().expect("actor").position
    }
}
