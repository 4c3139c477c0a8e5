//! Bevy plugin driving a [`Session`] from the app schedule.
//!
//! The host inserts an activated session as a non-send resource. Each
//! `Update` the plugin forwards keyboard and mouse transitions as
//! [`RawInput`] and ticks the session by the frame's [`Time`] delta.

use bevy_app::{App, Plugin, Update};
use bevy_ecs::prelude::*;
use bevy_input::keyboard::KeyCode;
use bevy_input::mouse::MouseButton;
use bevy_input::ButtonInput;
use bevy_time::Time;
use log::{debug, error};
use thiserror::Error;

use crate::input::RawInput;
use crate::session::{Session, SessionError, TickReport};

/// Raised when a session tick fails for a reason other than not being ready.
#[derive(Event, Debug, Clone, Error)]
#[error("session tick failed: {detail}")]
pub struct SessionTickError {
    /// Rendered cause.
    pub detail: String,
}

/// Report of the most recent successful tick.
#[derive(Resource, Debug, Default)]
pub struct LastTickReport(pub Option<TickReport>);

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value."
)]
fn log_tick_error(event: On<SessionTickError>) {
    error!("{}", event.event());
}

/// DOM-style code for a pointer button; `None` for extra buttons.
const fn pointer_button(button: MouseButton) -> Option<u8> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Middle => Some(1),
        MouseButton::Right => Some(2),
        _ => None,
    }
}

/// Key codes reuse the variant names, which match the DOM `code` values.
fn key_code(key: KeyCode) -> String {
    format!("{key:?}")
}

/// Queues this frame's key and button transitions on the session.
pub fn forward_input_system(
    session: Option<NonSendMut<Session>>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
) {
    let Some(mut session) = session else {
        return;
    };
    if let Some(keys) = keys {
        for key in keys.get_just_pressed() {
            session.push_input(RawInput::KeyDown(key_code(*key)));
        }
        for key in keys.get_just_released() {
            session.push_input(RawInput::KeyUp(key_code(*key)));
        }
    }
    if let Some(buttons) = buttons {
        for button in buttons.get_just_pressed().filter_map(|b| pointer_button(*b)) {
            session.push_input(RawInput::PointerDown(button));
        }
        for button in buttons.get_just_released().filter_map(|b| pointer_button(*b)) {
            session.push_input(RawInput::PointerUp(button));
        }
    }
}

/// Ticks the session by the frame delta.
pub fn tick_session_system(
    session: Option<NonSendMut<Session>>,
    time: Res<Time>,
    mut last: ResMut<LastTickReport>,
    mut commands: Commands,
) {
    let Some(mut session) = session else {
        return;
    };
    match session.tick(time.delta()) {
        Ok(report) => last.0 = Some(report),
        Err(SessionError::NotReady) => debug!("session not ready; tick skipped"),
        Err(e) => commands.trigger(SessionTickError {
            detail: e.to_string(),
        }),
    }
}

/// Installs the input forwarding and tick systems.
#[derive(Default)]
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(log_tick_error);
        app.init_resource::<LastTickReport>();
        app.add_systems(Update, (forward_input_system, tick_session_system).chain());
    }
}
