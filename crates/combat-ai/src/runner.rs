//! Per-agent tick loop.
//!
//! A [`BehaviourRunner`] owns one agent's [`BehaviourContext`] and its live
//! state pointer into a shared [`Profile`]. Each [`tick`](BehaviourRunner::tick):
//!
//! 1. advances the agent clock and drops a dead target,
//! 2. resolves transitions (global first, then local, ascending priority),
//! 3. switches state on a win (exit hook, reset timer, enter hook) or
//!    accumulates `time_in_state` otherwise,
//! 4. emits skills queued by reactive triggers,
//! 5. asks the active state's selector for a skill and emits it.
//!
//! A skill is requested at most once per tick: repeated trigger hits collapse
//! into one request, and the selector never sees a skill a trigger already
//! emitted.
//!
//! The runner never fails. Missing data degrades to "no transition" and
//! "no skill".

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::BehaviourContext;
use crate::fsm::{Profile, State, StateId};
use crate::selectors::ready_named;
use crate::skill::{CombatSink, Skill, SkillRequest};
use crate::triggers::{EventBus, Subscription, TriggerQueue, TriggerScope, TriggerWatch};
use crate::types::UnitId;

/// Informational hooks fired around state changes.
///
/// Observers cannot influence decisions; they exist for animation cues,
/// telemetry and tests.
pub trait StateObserver: Send {
    fn on_exit(&mut self, _unit: UnitId, _state: &str) {}
    fn on_enter(&mut self, _unit: UnitId, _state: &str) {}
}

/// A state change that happened during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub from: StateId,
    pub to: StateId,
    /// True if a global transition fired.
    pub global: bool,
}

/// Everything a tick did, for drivers and tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub transition: Option<StateChange>,
    /// Skill chosen by the active state's selector.
    pub skill: Option<SkillRequest>,
    /// Skills emitted by reactive triggers, in firing order.
    pub triggered: Vec<SkillRequest>,
}

/// Drives one agent through a shared [`Profile`].
pub struct BehaviourRunner {
    profile: Arc<Profile>,
    ctx: BehaviourContext,
    current: StateId,
    observers: Vec<Box<dyn StateObserver>>,
    queue: TriggerQueue,
    watched_target: Arc<Mutex<Option<UnitId>>>,
    scope: TriggerScope,
}

impl BehaviourRunner {
    /// Creates a runner in the profile's initial state.
    ///
    /// No enter hook fires for the initial state; observers are registered
    /// afterwards.
    pub fn new(profile: Arc<Profile>, ctx: BehaviourContext) -> Self {
        let current = profile.initial();
        let watched_target = Arc::new(Mutex::new(ctx.current_target()));
        Self {
            profile,
            ctx,
            current,
            observers: Vec::new(),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            watched_target,
            scope: TriggerScope::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    pub fn context(&self) -> &BehaviourContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut BehaviourContext {
        &mut self.ctx
    }

    pub fn unit(&self) -> UnitId {
        self.ctx.unit()
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn current_state_name(&self) -> &str {
        self.profile.state_name(self.current)
    }

    pub fn add_observer(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Runs one decision step.
    ///
    /// # Arguments
    ///
    /// * `dt` - Seconds since the previous tick
    /// * `skills` - The agent's current skill set
    /// * `sink` - Receives every emitted [`SkillRequest`]
    pub fn tick<S, K>(&mut self, dt: f32, skills: &[S], sink: &mut K) -> TickReport
    where
        S: Skill,
        K: CombatSink + ?Sized,
    {
        let mut report = TickReport::default();

        self.ctx.advance_clock(dt);
        self.ctx.drop_dead_target();

        let resolved = self
            .profile
            .resolve(&mut self.ctx, self.current)
            .map(|r| (r.transition.target(), r.global));

        match resolved {
            Some((to, global)) => {
                let from = self.current;
                self.switch_to(to, if global { "global" } else { "local" });
                report.transition = Some(StateChange { from, to, global });
            }
            None => self.ctx.advance_time_in_state(dt),
        }

        *self.watched_target.lock() = self.ctx.current_target();

        let fired: Vec<String> = self.queue.lock().drain(..).collect();
        for name in fired {
            if report.triggered.iter().any(|r| r.skill == name) {
                continue;
            }
            match ready_named(skills, &name) {
                Some(skill) => {
                    let request = self.request(skill.name());
                    tracing::debug!("{}: trigger fired {}", self.ctx.unit(), request.skill);
                    sink.use_skill(request.clone());
                    report.triggered.push(request);
                }
                None => tracing::trace!(
                    "{}: triggered skill {} is unavailable",
                    self.ctx.unit(),
                    name
                ),
            }
        }

        let picked = match self.profile.state(self.current).and_then(State::selector) {
            Some(selector) if report.triggered.is_empty() => selector
                .select(&mut self.ctx, skills)
                .map(|skill| skill.name().to_owned()),
            Some(selector) => {
                // Skills already fired by a trigger this tick are not offered again.
                let remaining: Vec<&S> = skills
                    .iter()
                    .filter(|skill| !report.triggered.iter().any(|r| r.skill == skill.name()))
                    .collect();
                selector
                    .select(&mut self.ctx, &remaining)
                    .map(|skill| skill.name().to_owned())
            }
            None => None,
        };

        if let Some(name) = picked {
            let request = self.request(&name);
            sink.use_skill(request.clone());
            report.skill = Some(request);
        }

        report
    }

    /// Moves to the named state immediately, outside transition resolution.
    ///
    /// Fires exit/enter hooks and resets `time_in_state` like a regular
    /// transition. Returns false if the profile has no such state.
    pub fn force_state(&mut self, name: &str) -> bool {
        match self.profile.state_id(name) {
            Some(id) => {
                self.switch_to(id, "forced");
                true
            }
            None => {
                tracing::warn!("{}: cannot force unknown state '{}'", self.ctx.unit(), name);
                false
            }
        }
    }

    fn switch_to(&mut self, to: StateId, cause: &str) {
        let unit = self.ctx.unit();
        let from_name = self.profile.state_name(self.current);
        let to_name = self.profile.state_name(to);

        for observer in &mut self.observers {
            observer.on_exit(unit, from_name);
        }

        tracing::debug!("{}: {} -> {} ({})", unit, from_name, to_name, cause);
        self.current = to;
        self.ctx.reset_time_in_state();

        for observer in &mut self.observers {
            observer.on_enter(unit, to_name);
        }
    }

    fn request(&self, skill: &str) -> SkillRequest {
        SkillRequest {
            caster: self.ctx.unit(),
            skill: skill.to_owned(),
            target: self.ctx.current_target(),
        }
    }

    // ========================================================================
    // Reactive triggers
    // ========================================================================

    /// Subscribes the profile's skill triggers to `bus`.
    ///
    /// Any previous registration is released first. Subscriptions live until
    /// [`Self::disable_triggers`] or until the runner is dropped.
    pub fn enable_triggers(&mut self, bus: &Arc<EventBus>) {
        self.scope.release_all();

        let watch = TriggerWatch {
            unit: self.ctx.unit(),
            team: self.ctx.team(),
            target: Arc::clone(&self.watched_target),
        };

        for trigger in self.profile.triggers() {
            let kind = trigger.on.clone();
            let skill = trigger.skill.clone();
            let watch = watch.clone();
            let queue = Arc::clone(&self.queue);

            self.scope.adopt(Subscription::on_bus(bus, move |event| {
                if kind.matches(&watch, event) {
                    queue.lock().push_back(skill.clone());
                }
            }));
        }

        tracing::debug!(
            "{}: enabled {} trigger(s)",
            self.ctx.unit(),
            self.scope.len()
        );
    }

    /// Releases every trigger subscription and forgets queued skills.
    pub fn disable_triggers(&mut self) {
        self.scope.release_all();
        self.queue.lock().clear();
    }

    pub fn triggers_enabled(&self) -> bool {
        !self.scope.is_empty()
    }
}

impl std::fmt::Debug for BehaviourRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviourRunner")
            .field("profile", &self.profile.name())
            .field("state", &self.current_state_name())
            .field("ctx", &self.ctx)
            .field("triggers", &self.scope.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::{Condition, HealthCondition, Threshold};
    use crate::fsm::{ProfileDef, StateDef, TransitionDef};
    use crate::selectors::SkillSelector;
    use crate::skill::{DiscardSink, SkillSlot};
    use crate::triggers::{CombatEvent, SkillTrigger, TriggerKind};
    use crate::types::{TeamId, Vec3};
    use crate::world::InMemoryWorld;

    fn runner(def: ProfileDef) -> (Arc<InMemoryWorld>, BehaviourRunner) {
        let world = Arc::new(InMemoryWorld::new());
        world.spawn(UnitId(1), TeamId(0), Vec3::ZERO);
        let ctx = BehaviourContext::new(UnitId(1), TeamId(0), Vec3::ZERO, world.clone());
        let profile = Arc::new(def.build().unwrap());
        (world, BehaviourRunner::new(profile, ctx))
    }

    #[derive(Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl StateObserver for Recorder {
        fn on_exit(&mut self, _unit: UnitId, state: &str) {
            self.0.lock().push(format!("exit {state}"));
        }

        fn on_enter(&mut self, _unit: UnitId, state: &str) {
            self.0.lock().push(format!("enter {state}"));
        }
    }

    #[test]
    fn runner_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<BehaviourRunner>();
    }

    #[test]
    fn hooks_fire_exit_then_enter() {
        let (_w, mut runner) = runner(
            ProfileDef::new("p")
                .initial("A")
                .state(StateDef::new("A").transition(TransitionDef::to("B")))
                .state(StateDef::new("B")),
        );
        let log = Arc::new(Mutex::new(Vec::new()));
        runner.add_observer(Box::new(Recorder(Arc::clone(&log))));

        let report = runner.tick(0.1, &[] as &[SkillSlot], &mut DiscardSink);
        assert_eq!(runner.current_state_name(), "B");
        assert!(report.transition.is_some_and(|c| !c.global));
        assert_eq!(*log.lock(), vec!["exit A".to_owned(), "enter B".to_owned()]);
    }

    #[test]
    fn selector_runs_after_transition_in_new_state() {
        let (_w, mut runner) = runner(
            ProfileDef::new("p")
                .initial("Idle")
                .state(StateDef::new("Idle").transition(TransitionDef::to("Fight")))
                .state(StateDef::new("Fight").selector(SkillSelector::FirstAvailable)),
        );
        let skills = vec![SkillSlot::new("Slash", 1.0)];
        let mut sink: Vec<SkillRequest> = Vec::new();

        let report = runner.tick(0.1, &skills, &mut sink);
        assert_eq!(report.skill.as_ref().map(|r| r.skill.as_str()), Some("Slash"));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].caster, UnitId(1));
    }

    #[test]
    fn force_state_resets_timer() {
        let (_w, mut runner) = runner(
            ProfileDef::new("p")
                .initial("A")
                .state(StateDef::new("A"))
                .state(StateDef::new("Reset")),
        );
        runner.tick(0.5, &[] as &[SkillSlot], &mut DiscardSink);
        assert_eq!(runner.context().time_in_state(), 0.5);

        assert!(runner.force_state("Reset"));
        assert_eq!(runner.current_state_name(), "Reset");
        assert_eq!(runner.context().time_in_state(), 0.0);
        assert!(!runner.force_state("Missing"));
    }

    #[test]
    fn health_drives_flee() {
        let (_w, mut runner) = runner(
            ProfileDef::new("p")
                .initial("Fight")
                .state(StateDef::new("Fight").transition(
                    TransitionDef::to("Flee").when(Condition::Health(HealthCondition::new(
                        Threshold::LessThan(0.5),
                    ))),
                ))
                .state(StateDef::new("Flee")),
        );

        runner.context_mut().set_health_percent(0.6);
        let report = runner.tick(0.25, &[] as &[SkillSlot], &mut DiscardSink);
        assert!(report.transition.is_none());
        assert_eq!(runner.context().time_in_state(), 0.25);

        runner.context_mut().set_health_percent(0.4);
        runner.tick(0.25, &[] as &[SkillSlot], &mut DiscardSink);
        assert_eq!(runner.current_state_name(), "Flee");
        assert_eq!(runner.context().time_in_state(), 0.0);
    }

    #[test]
    fn triggers_queue_skills_until_disabled() {
        let (_w, mut runner) = runner(
            ProfileDef::new("p")
                .initial("A")
                .state(StateDef::new("A"))
                .trigger(SkillTrigger::new(TriggerKind::Damaged { min_amount: 5.0 }, "Parry")),
        );
        let bus = Arc::new(EventBus::new());
        runner.enable_triggers(&bus);
        assert!(runner.triggers_enabled());
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(&CombatEvent::Damaged {
            target: UnitId(1),
            source: None,
            amount: 8.0,
        });

        let skills = vec![SkillSlot::new("Parry", 2.0)];
        let report = runner.tick(0.1, &skills, &mut DiscardSink);
        assert_eq!(report.triggered.len(), 1);
        assert_eq!(report.triggered[0].skill, "Parry");

        let report = runner.tick(0.1, &skills, &mut DiscardSink);
        assert!(report.triggered.is_empty());

        runner.disable_triggers();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(&CombatEvent::Damaged {
            target: UnitId(1),
            source: None,
            amount: 8.0,
        });
        assert!(runner.tick(0.1, &skills, &mut DiscardSink).triggered.is_empty());
    }

    #[test]
    fn skill_is_requested_once_per_tick() {
        let (_w, mut runner) = runner(
            ProfileDef::new("p")
                .initial("A")
                .state(StateDef::new("A").selector(SkillSelector::FirstAvailable))
                .trigger(SkillTrigger::new(TriggerKind::Healed, "Parry")),
        );
        let bus = Arc::new(EventBus::new());
        runner.enable_triggers(&bus);
        for _ in 0..2 {
            bus.publish(&CombatEvent::Healed {
                target: UnitId(1),
                amount: 0.1,
            });
        }

        let skills = vec![SkillSlot::new("Parry", 2.0), SkillSlot::new("Jab", 1.0)];
        let mut sink: Vec<SkillRequest> = Vec::new();
        let report = runner.tick(0.1, &skills, &mut sink);

        assert_eq!(report.triggered.len(), 1);
        assert_eq!(report.skill.as_ref().map(|r| r.skill.as_str()), Some("Jab"));
        let names: Vec<&str> = sink.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(names, vec!["Parry", "Jab"]);
    }

    #[test]
    fn dropping_runner_releases_triggers() {
        let (_w, mut runner) = runner(
            ProfileDef::new("p")
                .initial("A")
                .state(StateDef::new("A"))
                .trigger(SkillTrigger::new(TriggerKind::Healed, "Taunt"))
                .trigger(SkillTrigger::new(TriggerKind::AllyDied, "Enrage")),
        );
        let bus = Arc::new(EventBus::new());
        runner.enable_triggers(&bus);
        assert_eq!(bus.subscriber_count(), 2);

        // Re-enabling replaces rather than stacks.
        runner.enable_triggers(&bus);
        assert_eq!(bus.subscriber_count(), 2);

        drop(runner);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
