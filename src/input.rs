//! Raw key/pointer events mapped to named actions.
//!
//! Movement actions are level-triggered: they stay held until released.
//! Fire and jump are edge-triggered: a press is reported once, on the
//! transition from released to held, no matter how long the key stays down
//! or how many repeat events the platform sends.

use hashbrown::HashMap;
use log::trace;
use serde::{Deserialize, Serialize};

/// The fixed set of controller actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Walk forward.
    Forward,
    /// Walk backward.
    Backward,
    /// Turn left.
    Left,
    /// Turn right.
    Right,
    /// Throw a projectile.
    PrimaryFire,
    /// Fire a shot.
    SecondaryFire,
    /// Jump.
    Jump,
}

impl Action {
    /// Every action, in slot order.
    pub const ALL: [Self; 7] = [
        Self::Forward,
        Self::Backward,
        Self::Left,
        Self::Right,
        Self::PrimaryFire,
        Self::SecondaryFire,
        Self::Jump,
    ];

    /// Whether presses of this action are delivered as one-off edges.
    #[must_use]
    pub const fn is_edge_triggered(self) -> bool {
        matches!(self, Self::PrimaryFire | Self::SecondaryFire | Self::Jump)
    }

    const fn index(self) -> usize {
        match self {
            Self::Forward => 0,
            Self::Backward => 1,
            Self::Left => 2,
            Self::Right => 3,
            Self::PrimaryFire => 4,
            Self::SecondaryFire => 5,
            Self::Jump => 6,
        }
    }
}

/// An event from the host's input source.
///
/// Key codes follow the DOM `KeyboardEvent.code` naming (`"KeyW"`,
/// `"Space"`); pointer buttons are numbered 0 (primary) to 2 (secondary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawInput {
    /// A key went down, or auto-repeated.
    KeyDown(String),
    /// A key was released.
    KeyUp(String),
    /// A pointer button went down.
    PointerDown(u8),
    /// A pointer button was released.
    PointerUp(u8),
}

/// Maps key codes and pointer buttons to actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Key code bindings.
    pub keys: HashMap<String, Action>,
    /// Pointer button bindings.
    pub buttons: HashMap<u8, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = [
            ("KeyW", Action::Forward),
            ("ArrowUp", Action::Forward),
            ("KeyS", Action::Backward),
            ("ArrowDown", Action::Backward),
            ("KeyA", Action::Left),
            ("ArrowLeft", Action::Left),
            ("KeyD", Action::Right),
            ("ArrowRight", Action::Right),
            ("KeyE", Action::SecondaryFire),
            ("Space", Action::Jump),
        ]
        .into_iter()
        .map(|(code, action)| (code.to_owned(), action))
        .collect();
        let buttons = [(2, Action::PrimaryFire)].into_iter().collect();
        Self { keys, buttons }
    }
}

impl KeyBindings {
    /// Resolves a raw event to `(action, pressed)`, or `None` if unbound.
    #[must_use]
    pub fn resolve(&self, raw: &RawInput) -> Option<(Action, bool)> {
        match raw {
            RawInput::KeyDown(code) => self.keys.get(code).map(|a| (*a, true)),
            RawInput::KeyUp(code) => self.keys.get(code).map(|a| (*a, false)),
            RawInput::PointerDown(button) => self.buttons.get(button).map(|a| (*a, true)),
            RawInput::PointerUp(button) => self.buttons.get(button).map(|a| (*a, false)),
        }
    }
}

/// Held state of the four movement actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "This struct represents the held state of exactly four movement actions."
)]
pub struct MovementFlags {
    /// [`Action::Forward`] is held.
    pub forward: bool,
    /// [`Action::Backward`] is held.
    pub backward: bool,
    /// [`Action::Left`] is held.
    pub left: bool,
    /// [`Action::Right`] is held.
    pub right: bool,
}

impl MovementFlags {
    /// Whether any linear (forward/backward) action is held.
    #[must_use]
    pub const fn linear(self) -> bool {
        self.forward || self.backward
    }
}

/// Edge-triggered presses collected since the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionEdges {
    /// [`Action::PrimaryFire`] was pressed.
    pub primary_fire: bool,
    /// [`Action::SecondaryFire`] was pressed.
    pub secondary_fire: bool,
    /// [`Action::Jump`] was pressed.
    pub jump: bool,
}

/// What the controller sees for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    /// Held movement actions.
    pub movement: MovementFlags,
    /// Presses since the previous frame.
    pub edges: ActionEdges,
}

/// Per-action held flags plus pending press edges.
///
/// Only raw input handling writes here; the controller reads a
/// [`InputFrame`] snapshot once per tick.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: [bool; 7],
    edges: ActionEdges,
}

impl InputState {
    /// Nothing held, no pending edges.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `action` is currently held.
    #[must_use]
    pub const fn is_held(&self, action: Action) -> bool {
        self.held[action.index()]
    }

    /// Marks `action` held, recording an edge on the released → held
    /// transition for edge-triggered actions.
    pub const fn press(&mut self, action: Action) {
        let slot = &mut self.held[action.index()];
        if *slot {
            return;
        }
        *slot = true;
        match action {
            Action::PrimaryFire => self.edges.primary_fire = true,
            Action::SecondaryFire => self.edges.secondary_fire = true,
            Action::Jump => self.edges.jump = true,
            Action::Forward | Action::Backward | Action::Left | Action::Right => {}
        }
    }

    /// Marks `action` released. Never produces an edge.
    pub const fn release(&mut self, action: Action) {
        self.held[action.index()] = false;
    }

    /// Applies a raw event through `bindings`. Returns the affected action.
    pub fn apply(&mut self, raw: &RawInput, bindings: &KeyBindings) -> Option<Action> {
        let (action, pressed) = bindings.resolve(raw)?;
        trace!("{raw:?} -> {action:?} pressed={pressed}");
        if pressed {
            self.press(action);
        } else {
            self.release(action);
        }
        Some(action)
    }

    /// Movement flags right now.
    #[must_use]
    pub const fn movement(&self) -> MovementFlags {
        MovementFlags {
            forward: self.is_held(Action::Forward),
            backward: self.is_held(Action::Backward),
            left: self.is_held(Action::Left),
            right: self.is_held(Action::Right),
        }
    }

    /// Snapshot for the controller; pending edges are consumed.
    pub fn take_frame(&mut self) -> InputFrame {
        InputFrame {
            movement: self.movement(),
            edges: std::mem::take(&mut self.edges),
        }
    }

    /// Releases everything and forgets pending edges, e.g. on focus loss.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
