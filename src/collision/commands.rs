//! Buffered scene mutations requested from inside collision callbacks.

use std::time::Duration;

use crate::collision::SubscriptionId;
use crate::entity::EntityId;

/// A mutation the session applies once per tick after collision dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    /// Arrange for a projectile to be disposed after the configured delay.
    ScheduleDisposal(EntityId),
    /// Arrange for any entity to be disposed after `delay`.
    DisposeAfter {
        /// Entity to remove.
        entity: EntityId,
        /// Simulated time to wait, counted from the next tick.
        delay: Duration,
    },
    /// Dispose an entity at the end of the current dispatch.
    Dispose(EntityId),
    /// Drop a collision subscription.
    Unsubscribe(SubscriptionId),
}

/// FIFO of [`SceneCommand`]s drained by the session each tick.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<SceneCommand>,
}

impl CommandQueue {
    /// Appends one command.
    pub fn push(&mut self, command: SceneCommand) {
        self.commands.push(command);
    }

    /// Appends commands in iteration order.
    pub fn extend<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = SceneCommand>,
    {
        self.commands.extend(commands);
    }

    /// Removes and yields every queued command, oldest first.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SceneCommand> {
        self.commands.drain(..)
    }

    /// Whether nothing is queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of queued commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }
}
