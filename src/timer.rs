//! Cancellable timers running on simulated time.
//!
//! Time only moves when [`TimerQueue::advance`] is called from the tick, so
//! deferred work never runs mid-tick and tests stay deterministic.

use std::time::Duration;

use log::trace;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    deadline: Duration,
    payload: T,
}

/// Pending deferred payloads ordered by deadline.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    /// An empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time elapsed since the queue was created.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `payload` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let deadline = self.now + delay;
        trace!("timer {id:?} due at {deadline:?}");
        self.pending.push(Timer {
            id,
            deadline,
            payload,
        });
        id
    }

    /// Cancels a pending timer, handing back its payload. Cancelling a timer
    /// that already fired or was cancelled returns `None`.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let index = self.pending.iter().position(|t| t.id == id)?;
        Some(self.pending.swap_remove(index).payload)
    }

    /// Whether `id` has neither fired nor been cancelled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    /// Number of pending timers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Moves time forward and returns every timer that came due, earliest
    /// first. Timers scheduled at the same deadline keep scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<(TimerId, T)> {
        self.now += dt;
        let now = self.now;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|t| t.deadline <= now);
        self.pending = waiting;
        due.sort_by_key(|t| (t.deadline, t.id));
        due.into_iter().map(|t| (t.id, t.payload)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[rstest]
    fn fires_once_deadline_is_reached() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(ms(3000), "dispose");
        assert!(timers.advance(ms(2999)).is_empty());
        assert!(timers.is_pending(id));
        assert_eq!(timers.advance(ms(1)), vec![(id, "dispose")]);
        assert!(timers.is_empty());
        assert!(timers.advance(ms(5000)).is_empty());
    }

    #[rstest]
    fn due_timers_come_out_in_deadline_order() {
        let mut timers = TimerQueue::new();
        let late = timers.schedule(ms(30), 'b');
        let early = timers.schedule(ms(10), 'a');
        let tie = timers.schedule(ms(30), 'c');
        let fired = timers.advance(ms(100));
        assert_eq!(fired, vec![(early, 'a'), (late, 'b'), (tie, 'c')]);
    }

    #[rstest]
    fn cancelled_timers_never_fire() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(ms(10), 1);
        assert_eq!(timers.cancel(id), Some(1));
        assert_eq!(timers.cancel(id), None);
        assert!(timers.advance(ms(20)).is_empty());
    }

    #[rstest]
    fn delays_are_relative_to_current_time() {
        let mut timers = TimerQueue::new();
        timers.advance(ms(500));
        let id = timers.schedule(ms(100), ());
        assert!(timers.advance(ms(99)).is_empty());
        assert_eq!(timers.advance(ms(1)).len(), 1);
        assert!(!timers.is_pending(id));
        assert_eq!(timers.now(), ms(600));
    }
}
