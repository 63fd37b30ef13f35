//! Reactive skill triggers.
//!
//! Combat events (damage, heals, deaths) are published synchronously on an
//! [`EventBus`]. A runner with triggers enabled subscribes once per authored
//! [`SkillTrigger`]; a matching event queues the trigger's skill, which the
//! next tick emits if the agent has it ready.
//!
//! Subscriptions are lifecycle-scoped: a [`Subscription`] runs its
//! unsubscribe action exactly once, on [`Subscription::release`] or on drop,
//! and a [`TriggerScope`] owns every subscription a runner made.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::types::{TeamId, UnitId};

// ============================================================================
// Events and bus
// ============================================================================

/// Something that happened in combat, reported by the external damage feed.
#[derive(Clone, Debug, PartialEq)]
pub enum CombatEvent {
    Damaged {
        target: UnitId,
        source: Option<UnitId>,
        amount: f32,
    },
    Healed {
        target: UnitId,
        amount: f32,
    },
    Died {
        unit: UnitId,
        team: TeamId,
    },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&CombatEvent) + Send + Sync>;

/// Synchronous fan-out of [`CombatEvent`]s.
///
/// Handlers are invoked on the publishing thread, in subscription order. The
/// handler list is snapshotted before dispatch, so a handler may subscribe or
/// unsubscribe without deadlocking the bus.
pub struct EventBus {
    handlers: Mutex<Vec<(SubscriptionId, Handler)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CombatEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((id, Arc::new(handler)));
        id
    }

    /// Removes a handler. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    pub fn publish(&self, event: &CombatEvent) {
        let snapshot: Vec<Handler> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        if snapshot.is_empty() {
            tracing::trace!("No subscribers for {:?}", event);
        }

        for handler in snapshot {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Scoped subscriptions
// ============================================================================

/// Runs an unsubscribe action exactly once, on release or on drop.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Subscription on `bus` that unsubscribes itself.
    pub fn on_bus<F>(bus: &Arc<EventBus>, handler: F) -> Self
    where
        F: Fn(&CombatEvent) + Send + Sync + 'static,
    {
        let id = bus.subscribe(handler);
        let bus = Arc::clone(bus);
        Self::new(move || {
            bus.unsubscribe(id);
        })
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Unsubscribes now. Later calls and the eventual drop do nothing.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Owns every subscription one component made; releases them together.
#[derive(Debug, Default)]
pub struct TriggerScope {
    subscriptions: Vec<Subscription>,
}

impl TriggerScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `subscribe` now and remembers `unsubscribe` for release.
    ///
    /// # Arguments
    ///
    /// * `subscribe` - Registers the handler, returning whatever the
    ///   unsubscribe side needs (typically a [`SubscriptionId`])
    /// * `unsubscribe` - Undoes the registration; called exactly once
    pub fn register<T, S, U>(&mut self, subscribe: S, unsubscribe: U)
    where
        S: FnOnce() -> T,
        U: FnOnce(T) + Send + 'static,
        T: Send + 'static,
    {
        let token = subscribe();
        self.subscriptions
            .push(Subscription::new(move || unsubscribe(token)));
    }

    pub fn adopt(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Releases every subscription, in registration order.
    pub fn release_all(&mut self) {
        for mut sub in self.subscriptions.drain(..) {
            sub.release();
        }
    }
}

impl Drop for TriggerScope {
    fn drop(&mut self) {
        self.release_all();
    }
}

// ============================================================================
// Authored triggers
// ============================================================================

/// Event pattern a [`SkillTrigger`] reacts to, from the owning agent's view.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerKind {
    /// The agent took at least `min_amount` damage in one hit.
    Damaged {
        #[cfg_attr(feature = "serde", serde(default))]
        min_amount: f32,
    },
    /// The agent was healed.
    Healed,
    /// A unit on the agent's team (other than the agent) died.
    AllyDied,
    /// The agent's current target died.
    TargetDied,
}

/// "When X happens, use skill Y."
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillTrigger {
    pub on: TriggerKind,
    pub skill: String,
}

impl SkillTrigger {
    pub fn new(on: TriggerKind, skill: impl Into<String>) -> Self {
        Self {
            on,
            skill: skill.into(),
        }
    }
}

/// What a trigger handler knows about its agent.
///
/// The target is shared with the runner because it changes every tick.
#[derive(Clone, Debug)]
pub(crate) struct TriggerWatch {
    pub unit: UnitId,
    pub team: TeamId,
    pub target: Arc<Mutex<Option<UnitId>>>,
}

impl TriggerKind {
    pub(crate) fn matches(&self, watch: &TriggerWatch, event: &CombatEvent) -> bool {
        match (self, event) {
            (TriggerKind::Damaged { min_amount }, CombatEvent::Damaged { target, amount, .. }) => {
                *target == watch.unit && *amount >= *min_amount
            }
            (TriggerKind::Healed, CombatEvent::Healed { target, .. }) => *target == watch.unit,
            (TriggerKind::AllyDied, CombatEvent::Died { unit, team }) => {
                *unit != watch.unit && *team == watch.team
            }
            (TriggerKind::TargetDied, CombatEvent::Died { unit, .. }) => {
                *watch.target.lock() == Some(*unit)
            }
            _ => false,
        }
    }
}

/// Queue of skill names fired by triggers, drained by the runner each tick.
pub(crate) type TriggerQueue = Arc<Mutex<VecDeque<String>>>;

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn publish_reaches_every_subscriber() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            bus.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.publish(&CombatEvent::Healed {
            target: UnitId(1),
            amount: 5.0,
        });
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn subscription_releases_exactly_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&releases);
        let mut sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sub.release();
        sub.release();
        drop(sub);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = Arc::new(EventBus::new());
        let sub = Subscription::on_bus(&bus, |_| {});
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn scope_releases_all_on_drop() {
        let bus = Arc::new(EventBus::new());
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let mut scope = TriggerScope::new();
            for _ in 0..2 {
                let bus_sub = Arc::clone(&bus);
                let bus_unsub = Arc::clone(&bus);
                let releases = Arc::clone(&releases);
                scope.register(
                    move || bus_sub.subscribe(|_| {}),
                    move |id| {
                        bus_unsub.unsubscribe(id);
                        releases.fetch_add(1, Ordering::SeqCst);
                    },
                );
            }
            assert_eq!(bus.subscriber_count(), 2);
            scope.release_all();
            assert!(scope.is_empty());
        }
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(releases.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handler_may_unsubscribe_during_publish() {
        let bus = Arc::new(EventBus::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
        let inner_bus = Arc::clone(&bus);
        let inner_slot = Arc::clone(&slot);
        let id = bus.subscribe(move |_| {
            if let Some(id) = inner_slot.lock().take() {
                inner_bus.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        bus.publish(&CombatEvent::Died {
            unit: UnitId(9),
            team: TeamId(1),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn trigger_kinds_match_from_the_agents_view() {
        let watch = TriggerWatch {
            unit: UnitId(1),
            team: TeamId(0),
            target: Arc::new(Mutex::new(Some(UnitId(7)))),
        };

        let hit = CombatEvent::Damaged {
            target: UnitId(1),
            source: Some(UnitId(7)),
            amount: 12.0,
        };
        assert!(TriggerKind::Damaged { min_amount: 10.0 }.matches(&watch, &hit));
        assert!(!TriggerKind::Damaged { min_amount: 20.0 }.matches(&watch, &hit));

        let ally = CombatEvent::Died {
            unit: UnitId(2),
            team: TeamId(0),
        };
        assert!(TriggerKind::AllyDied.matches(&watch, &ally));
        assert!(!TriggerKind::TargetDied.matches(&watch, &ally));

        let target = CombatEvent::Died {
            unit: UnitId(7),
            team: TeamId(1),
        };
        assert!(TriggerKind::TargetDied.matches(&watch, &target));
        assert!(!TriggerKind::AllyDied.matches(&watch, &target));
    }
}
