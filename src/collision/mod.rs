//! Collision event subscriptions dispatched after every physics step.
//!
//! The bus matches the contact pairs reported by the physics world against
//! registered subscriptions and runs their callbacks synchronously. No order
//! is promised between distinct pairs within one tick. Callbacks never touch
//! session state directly: they push [`SceneCommand`]s, which the session
//! applies once dispatch has finished.

mod commands;

use std::panic::{self, AssertUnwindSafe};

use hashbrown::HashSet;
use log::{debug, error};

use crate::physics::{BodyHandle, ContactPair};

pub use commands::{CommandQueue, SceneCommand};

/// Identifies a subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// How often a subscription fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionMode {
    /// Every tick the pair is in contact.
    Persistent,
    /// Once, then the subscription is removed.
    OneShot,
    /// Once per contact episode; re-armed after a tick without contact.
    PerContact,
}

/// The partner side of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionTarget {
    /// A single partner body.
    Body(BodyHandle),
    /// Any body in the set.
    Set(Vec<BodyHandle>),
}

impl CollisionTarget {
    fn matches(&self, body: BodyHandle) -> bool {
        match self {
            Self::Body(b) => *b == body,
            Self::Set(set) => set.contains(&body),
        }
    }

    fn remove(&mut self, body: BodyHandle) -> bool {
        match self {
            Self::Body(b) => *b == body,
            Self::Set(set) => {
                set.retain(|b| *b != body);
                set.is_empty()
            }
        }
    }
}

impl From<BodyHandle> for CollisionTarget {
    fn from(body: BodyHandle) -> Self {
        Self::Body(body)
    }
}

impl From<Vec<BodyHandle>> for CollisionTarget {
    fn from(set: Vec<BodyHandle>) -> Self {
        Self::Set(set)
    }
}

/// Passed to a callback each time it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    /// The subscription being fired.
    pub subscription: SubscriptionId,
    /// The subscribed body.
    pub body: BodyHandle,
    /// The body it touched.
    pub other: BodyHandle,
}

/// Callback run on contact. Errors are logged by the bus and never stop
/// dispatch for other subscriptions.
pub type CollisionCallback = Box<dyn FnMut(&ContactEvent, &mut CommandQueue) -> anyhow::Result<()>>;

struct Subscription {
    id: SubscriptionId,
    body: BodyHandle,
    target: CollisionTarget,
    mode: CollisionMode,
    callback: CollisionCallback,
    touching: HashSet<BodyHandle>,
}

/// Outcome counts for a single dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Callbacks that returned `Ok`.
    pub fired: usize,
    /// Callbacks that returned `Err` or panicked.
    pub failed: usize,
}

/// Registry of collision subscriptions.
#[derive(Default)]
pub struct CollisionBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl std::fmt::Debug for CollisionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn invoke(sub: &mut Subscription, other: BodyHandle, commands: &mut CommandQueue) -> bool {
    let event = ContactEvent {
        subscription: sub.id,
        body: sub.body,
        other,
    };
    let callback = &mut sub.callback;
    match panic::catch_unwind(AssertUnwindSafe(|| callback(&event, commands))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!("collision callback {:?} failed: {e:#}", event.subscription);
            false
        }
        Err(payload) => {
            error!(
                "collision callback {:?} panicked: {}",
                event.subscription,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

impl CollisionBus {
    /// An empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for contacts between `body` and `target`.
    pub fn on_collide<T, F>(
        &mut self,
        body: BodyHandle,
        target: T,
        callback: F,
        mode: CollisionMode,
    ) -> SubscriptionId
    where
        T: Into<CollisionTarget>,
        F: FnMut(&ContactEvent, &mut CommandQueue) -> anyhow::Result<()> + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription {
            id,
            body,
            target: target.into(),
            mode,
            callback: Box::new(callback),
            touching: HashSet::new(),
        });
        debug!("subscription {id:?} registered for {body:?} ({mode:?})");
        id
    }

    /// Removes a subscription; returns `false` if it was already gone.
    pub fn off_collide(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        before != self.subscriptions.len()
    }

    /// Drops `body` from every subscription, removing those left without a
    /// subscriber or a target. Returns how many subscriptions were removed.
    pub fn off_body(&mut self, body: BodyHandle) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain_mut(|s| s.body != body && !s.target.remove(body));
        before - self.subscriptions.len()
    }

    /// Whether `id` is still registered.
    #[must_use]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.subscriptions.iter().any(|s| s.id == id)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscriptions are registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Runs every subscription matching the reported contacts.
    pub fn dispatch(&mut self, contacts: &[ContactPair], commands: &mut CommandQueue) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut spent = Vec::new();

        for sub in &mut self.subscriptions {
            let mut partners: Vec<BodyHandle> = contacts
                .iter()
                .filter_map(|c| c.other(sub.body))
                .filter(|other| sub.target.matches(*other))
                .collect();
            partners.sort_unstable();
            partners.dedup();

            let previously_touching = std::mem::take(&mut sub.touching);
            for other in partners {
                if sub.mode == CollisionMode::PerContact {
                    sub.touching.insert(other);
                    if previously_touching.contains(&other) {
                        continue;
                    }
                }
                if invoke(sub, other, commands) {
                    report.fired += 1;
                } else {
                    report.failed += 1;
                }
                if sub.mode == CollisionMode::OneShot {
                    spent.push(sub.id);
                    break;
                }
            }
        }

        if !spent.is_empty() {
            self.subscriptions.retain(|s| !spent.contains(&s.id));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use rstest::{fixture, rstest};
    use std::cell::Cell;
    use std::rc::Rc;

    const BALL: BodyHandle = BodyHandle(1);
    const GROUND: BodyHandle = BodyHandle(2);
    const PIN: BodyHandle = BodyHandle(3);

    #[fixture]
    fn bus() -> CollisionBus {
        CollisionBus::new()
    }

    fn counter(bus: &mut CollisionBus, target: impl Into<CollisionTarget>, mode: CollisionMode) -> (SubscriptionId, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let id = bus.on_collide(
            BALL,
            target,
            move |_, _| {
                seen.set(seen.get() + 1);
                Ok(())
            },
            mode,
        );
        (id, hits)
    }

    fn tick(bus: &mut CollisionBus, contacts: &[ContactPair]) -> DispatchReport {
        let mut queue = CommandQueue::default();
        bus.dispatch(contacts, &mut queue)
    }

    #[rstest]
    fn persistent_fires_every_tick_in_contact(mut bus: CollisionBus) {
        let (_, hits) = counter(&mut bus, GROUND, CollisionMode::Persistent);
        let touching = [ContactPair::new(GROUND, BALL)];
        for _ in 0..3 {
            tick(&mut bus, &touching);
        }
        tick(&mut bus, &[]);
        assert_eq!(hits.get(), 3);
    }

    #[rstest]
    fn one_shot_is_consumed(mut bus: CollisionBus) {
        let (id, hits) = counter(&mut bus, GROUND, CollisionMode::OneShot);
        let touching = [ContactPair::new(BALL, GROUND)];
        tick(&mut bus, &touching);
        tick(&mut bus, &touching);
        assert_eq!(hits.get(), 1);
        assert!(!bus.contains(id));
    }

    #[rstest]
    fn per_contact_rearms_after_separation(mut bus: CollisionBus) {
        let (_, hits) = counter(&mut bus, GROUND, CollisionMode::PerContact);
        let touching = [ContactPair::new(BALL, GROUND)];
        tick(&mut bus, &touching);
        tick(&mut bus, &touching);
        assert_eq!(hits.get(), 1);
        tick(&mut bus, &[]);
        tick(&mut bus, &touching);
        assert_eq!(hits.get(), 2);
    }

    #[rstest]
    fn set_targets_match_any_member(mut bus: CollisionBus) {
        let (_, hits) = counter(&mut bus, vec![GROUND, PIN], CollisionMode::Persistent);
        tick(
            &mut bus,
            &[ContactPair::new(BALL, GROUND), ContactPair::new(BALL, PIN)],
        );
        tick(&mut bus, &[ContactPair::new(GROUND, PIN)]);
        assert_eq!(hits.get(), 2);
    }

    #[rstest]
    fn failing_callbacks_do_not_stall_others(mut bus: CollisionBus) {
        bus.on_collide(
            BALL,
            GROUND,
            |_, _| Err(anyhow::anyhow!("material missing")),
            CollisionMode::Persistent,
        );
        bus.on_collide(
            BALL,
            GROUND,
            |_, _| panic!("faulty subscription"),
            CollisionMode::Persistent,
        );
        let (_, hits) = counter(&mut bus, GROUND, CollisionMode::Persistent);
        let report = tick(&mut bus, &[ContactPair::new(BALL, GROUND)]);
        assert_eq!(hits.get(), 1);
        assert_eq!(report, DispatchReport { fired: 1, failed: 2 });
    }

    #[rstest]
    fn callbacks_queue_commands(mut bus: CollisionBus) {
        bus.on_collide(
            BALL,
            GROUND,
            |_, commands| {
                commands.push(SceneCommand::ScheduleDisposal(EntityId(9)));
                Ok(())
            },
            CollisionMode::OneShot,
        );
        let mut queue = CommandQueue::default();
        bus.dispatch(&[ContactPair::new(BALL, GROUND)], &mut queue);
        assert_eq!(
            queue.drain().collect::<Vec<_>>(),
            vec![SceneCommand::ScheduleDisposal(EntityId(9))]
        );
    }

    #[rstest]
    fn unsubscribing(mut bus: CollisionBus) {
        let (id, hits) = counter(&mut bus, GROUND, CollisionMode::Persistent);
        assert!(bus.off_collide(id));
        assert!(!bus.off_collide(id));
        tick(&mut bus, &[ContactPair::new(BALL, GROUND)]);
        assert_eq!(hits.get(), 0);
    }

    #[rstest]
    fn off_body_prunes_sets_and_subscribers(mut bus: CollisionBus) {
        counter(&mut bus, vec![GROUND, PIN], CollisionMode::Persistent);
        counter(&mut bus, PIN, CollisionMode::Persistent);
        assert_eq!(bus.off_body(PIN), 1);
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.off_body(BALL), 1);
        assert!(bus.is_empty());
    }
}
