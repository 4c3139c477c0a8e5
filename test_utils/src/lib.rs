//! Fixtures shared by the playfield integration tests.
pub mod assertions;
pub mod fixtures;

pub use assertions::assert_vec3_near;
pub use fixtures::{block_on, full_model, model_loader, Rig, MODEL_PATH};
