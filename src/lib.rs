#![cfg_attr(docsrs, feature(doc_cfg))]
//! Physics-driven actor and projectile controller.
//!
//! Binds scene entities to an external rigid-body solver, turns keyboard and
//! pointer input into actor motion, spawns and disposes projectiles, and
//! reports collisions and trigger-zone transitions. [`Session`] ties the
//! pieces into a single tick; [`SessionPlugin`] runs that tick inside a Bevy
//! app.
pub mod animation;
pub mod assets;
pub mod camera;
pub mod collision;
pub mod config;
pub mod constants;
pub mod entity;
pub mod input;
pub mod locomotion;
pub mod logging;
pub mod numeric;
pub mod physics;
pub mod plugin;
pub mod projectile;
pub mod scene;
pub mod session;
pub mod timer;
pub mod trigger;
pub mod vector_math;
pub use constants::*;

// Re-export commonly used items
pub use animation::{AnimationCatalog, AnimationEvent, ClipKind};
pub use assets::{AssetLoadError, AssetLoader, LoadedModel, ManifestLoader, MemoryLoader};
pub use camera::{Camera, CameraFollow, OrbitCamera};
pub use collision::{CollisionBus, CollisionMode, CommandQueue, SceneCommand, SubscriptionId};
pub use config::{ConfigError, SessionConfig};
pub use entity::{Entity, EntityId};
pub use input::{Action, InputState, KeyBindings, RawInput};
pub use locomotion::{LocomotionConfig, LocomotionController, LocomotionState};
pub use logging::init as init_logging;
pub use physics::{
    applied_acceleration, BodyHandle, PhysicsError, PhysicsWorld, RigidBody, SandboxWorld,
    ShapeKind,
};
pub use plugin::SessionPlugin;
pub use projectile::{ProjectileSpawner, SpawnPlacement};
pub use scene::Scene;
pub use session::{Session, SessionError, Templates, TickReport};
pub use trigger::{TriggerEvent, TriggerVolume, TriggerZone};
pub use vector_math::vec_normalize;

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use playfield::prelude::*;
    //! ```

    pub use crate::applied_acceleration;
    pub use crate::physics::{PhysicsWorld, ShapeKind};
    pub use crate::Camera;
    pub use crate::CollisionMode;
    pub use crate::RawInput;
    pub use crate::Session;
    pub use crate::SessionConfig;
    pub use crate::Templates;
}
