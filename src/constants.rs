//! Controller tuning constants shared across systems.
//!
//! These are the defaults observed in the scene demos. Every value can be
//! overridden per session through [`crate::config::SessionConfig`].

/// Speed gained per tick while a linear action is held.
pub const ACCELERATION: f64 = 0.01;
/// Forward speed ceiling.
pub const MAX_SPEED: f64 = 1.0;
/// Backward motion runs at a third of forward speed unless configured.
pub const BACKWARD_FACTOR: f64 = 1.0 / 3.0;
/// Yaw change per tick while a turn action is held, in radians.
pub const TURN_STEP: f32 = 0.1;
/// Time from the throw animation starting to the projectile leaving the hand.
pub const THROW_RELEASE_DELAY_MS: u64 = 1600;
/// Time a landed projectile lingers before removal.
pub const DISPOSAL_DELAY_MS: u64 = 3000;
/// Impulse magnitude of a thrown projectile.
pub const THROW_IMPULSE: f32 = 750.0;
/// Impulse magnitude of a fired shot.
pub const SHOT_IMPULSE: f32 = 1000.0;
/// Offset of a thrown projectile from the actor for the right-handed branch.
pub const HANDED_SPAWN_OFFSET: [f32; 3] = [0.7, 1.0, 0.75];
/// Yaw window `(lower, upper)` selecting the right-handed spawn branch.
pub const HANDED_YAW_WINDOW: (f32, f32) = (-0.85, 0.6);
/// Upward velocity given to an embodied actor on jump.
pub const JUMP_IMPULSE: f32 = 0.8;
/// Height above which a jump press is ignored.
pub const MAX_JUMP_HEIGHT: f32 = 5.0;
/// Duration of a bodiless jump arc.
pub const JUMP_AIRTIME_MS: u64 = 800;
/// Default world gravity.
pub const GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];
/// Fixed tick length used by the headless demo loop.
pub const FRAME_DELTA_MS: u64 = 16;
