//! Session configuration loaded from JSON.
//!
//! Every field has a default matching the scene demos, so an empty object is
//! a valid configuration and files only need to name what they change.

use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{ClipKind, ClipSpec};
use crate::constants::FRAME_DELTA_MS;
use crate::input::KeyBindings;
use crate::locomotion::LocomotionConfig;
use crate::projectile::ProjectileConfig;

/// Failure to load a [`SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config `{path}`")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid config document.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything tunable about a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Walking and jumping tuning.
    pub locomotion: LocomotionConfig,
    /// Throw and shot tuning.
    pub projectiles: ProjectileConfig,
    /// Key and button mapping.
    pub bindings: KeyBindings,
    /// Clip name and rate overrides per clip kind.
    pub animations: HashMap<ClipKind, ClipSpec>,
    /// Whether the camera tracks the actor.
    pub camera_follow: bool,
    /// Fixed tick length for hosts without their own clock.
    pub frame_delta_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            locomotion: LocomotionConfig::default(),
            projectiles: ProjectileConfig::default(),
            bindings: KeyBindings::default(),
            animations: HashMap::new(),
            camera_follow: true,
            frame_delta_ms: FRAME_DELTA_MS,
        }
    }
}

impl SessionConfig {
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON or mistyped fields.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// # Errors
    /// Serialisation only fails for non-string map keys, which this type
    /// never produces.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
