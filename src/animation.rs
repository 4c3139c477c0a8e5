//! Name-keyed animation clip catalog.
//!
//! Loaders hand back clips in whatever order the model file stores them, so
//! clips are looked up by name and the catalog refuses to build when a
//! required name is missing.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The clips the locomotion controller can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipKind {
    /// Standing still.
    Idle,
    /// Walking along the local forward axis.
    WalkForward,
    /// Walking backwards.
    WalkBackward,
    /// One-shot wind-up; the projectile leaves when it ends.
    Throw,
    /// Turning on the spot towards the left.
    TurnLeft,
    /// Turning on the spot towards the right.
    TurnRight,
    /// Rising half of a jump.
    Jump,
    /// Falling half of a jump.
    Fall,
}

impl ClipKind {
    /// Every kind, in catalog order.
    pub const ALL: [Self; 8] = [
        Self::Idle,
        Self::WalkForward,
        Self::WalkBackward,
        Self::Throw,
        Self::TurnLeft,
        Self::TurnRight,
        Self::Jump,
        Self::Fall,
    ];

    /// Default clip name in the loaded model.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WalkForward => "walkForward",
            Self::WalkBackward => "walkBackward",
            Self::Throw => "throw",
            Self::TurnLeft => "turnLeft",
            Self::TurnRight => "turnRight",
            Self::Jump => "jump",
            Self::Fall => "fall",
        }
    }

    /// Whether the clip loops while selected.
    #[must_use]
    pub const fn loops(self) -> bool {
        !matches!(self, Self::Throw | Self::Jump | Self::Fall)
    }
}

/// A playable clip: name, playback rate and loop flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClipRef {
    /// Clip name as stored in the model.
    pub name: String,
    /// Playback rate multiplier.
    pub rate: f32,
    /// Whether the clip repeats until stopped.
    pub looping: bool,
}

/// Failures building an [`AnimationCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    /// The model has no clip under the name a kind resolves to.
    #[error("required animation clip `{name}` ({kind:?}) not found in loaded model")]
    MissingClip {
        /// The kind that could not be resolved.
        kind: ClipKind,
        /// The name it was looked up under.
        name: String,
    },
}

/// Per-kind overrides of clip name and rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Clip name in the loaded model.
    pub name: String,
    /// Playback rate, 1.0 when omitted.
    #[serde(default = "default_rate")]
    pub rate: f32,
}

const fn default_rate() -> f32 {
    1.0
}

/// Clips resolved for one actor.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationCatalog {
    clips: HashMap<ClipKind, AnimationClipRef>,
}

impl AnimationCatalog {
    /// Builds the catalog from the clip names a loader produced.
    ///
    /// `overrides` renames or re-rates individual kinds; every other kind is
    /// looked up under [`ClipKind::default_name`] at rate 1.
    ///
    /// # Errors
    /// Returns [`AnimationError::MissingClip`] for the first kind whose name is
    /// absent from `available`.
    pub fn from_loaded<S: AsRef<str>>(
        available: &[S],
        overrides: &HashMap<ClipKind, ClipSpec>,
    ) -> Result<Self, AnimationError> {
        let mut clips = HashMap::new();
        for kind in ClipKind::ALL {
            let (name, rate) = overrides.get(&kind).map_or_else(
                || (kind.default_name().to_owned(), 1.0),
                |spec| (spec.name.clone(), spec.rate),
            );
            if !available.iter().any(|a| a.as_ref() == name) {
                return Err(AnimationError::MissingClip { kind, name });
            }
            clips.insert(
                kind,
                AnimationClipRef {
                    name,
                    rate,
                    looping: kind.loops(),
                },
            );
        }
        Ok(Self { clips })
    }

    /// The clip for `kind`. Always present once the catalog is built.
    #[must_use]
    pub fn get(&self, kind: ClipKind) -> Option<&AnimationClipRef> {
        self.clips.get(&kind)
    }
}

/// Clip change announced to the host's animation player.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// Start `clip` for `kind`.
    Play {
        /// Which slot the clip fills.
        kind: ClipKind,
        /// The resolved clip.
        clip: AnimationClipRef,
    },
    /// Stop `clip`, which was playing for `kind`.
    Stop {
        /// Which slot the clip filled.
        kind: ClipKind,
        /// The resolved clip.
        clip: AnimationClipRef,
    },
}
