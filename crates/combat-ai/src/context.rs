//! Per-agent decision context.
//!
//! The [`BehaviourContext`] serves as the blackboard every condition and
//! skill selector reads from. It provides:
//!
//! - The agent's own state (position, spawn point, health, current target)
//! - Timing (time spent in the active state, simulation clock)
//! - Helper methods over the injected [`WorldQuery`] and [`ThreatSource`]
//! - Per-agent scratch state for conditions that need it (random-chance
//!   cooldowns) and a seeded RNG
//!
//! # Ownership
//!
//! One context per agent, exclusively owned by that agent's
//! [`BehaviourRunner`](crate::BehaviourRunner). Collaborators are injected at
//! construction as `Arc` handles; nothing is looked up from global state.

use std::collections::HashMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::conditions::ChanceId;
use crate::threat::ThreatSource;
use crate::types::{TeamId, UnitId, Vec3};
use crate::world::{TeamFilter, UnitSnapshot, WorldQuery};

/// Decision-relevant state for a single agent.
pub struct BehaviourContext {
    unit: UnitId,
    team: TeamId,
    position: Vec3,
    spawn_position: Vec3,
    current_target: Option<UnitId>,
    health_percent: f32,
    time_in_state: f32,
    clock: f32,
    world: Arc<dyn WorldQuery>,
    threat: Option<Arc<dyn ThreatSource>>,
    chance_rolls: HashMap<ChanceId, f32>,
    rng: ChaCha8Rng,
}

impl BehaviourContext {
    /// Creates a context for `unit` standing at its spawn point.
    ///
    /// The agent starts at full health, with no target and no threat
    /// system. The RNG is seeded from the unit id; use [`Self::with_seed`]
    /// to pick a different stream.
    pub fn new(unit: UnitId, team: TeamId, spawn_position: Vec3, world: Arc<dyn WorldQuery>) -> Self {
        Self {
            unit,
            team,
            position: spawn_position,
            spawn_position,
            current_target: None,
            health_percent: 1.0,
            time_in_state: 0.0,
            clock: 0.0,
            world,
            threat: None,
            chance_rolls: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(unit.0),
        }
    }

    /// Attaches a threat table (builder pattern).
    #[must_use]
    pub fn with_threat(mut self, threat: Arc<dyn ThreatSource>) -> Self {
        self.threat = Some(threat);
        self
    }

    /// Reseeds the per-agent RNG (builder pattern).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    // ========================================================================
    // Own state
    // ========================================================================

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }

    /// Euclidean distance from the spawn point.
    pub fn distance_from_spawn(&self) -> f32 {
        self.position.distance(self.spawn_position)
    }

    pub fn health_percent(&self) -> f32 {
        self.health_percent
    }

    /// Updates the health fraction, clamped into `[0, 1]`.
    pub fn set_health_percent(&mut self, health_percent: f32) {
        self.health_percent = health_percent.clamp(0.0, 1.0);
    }

    /// Seconds spent in the active state.
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Seconds since the runner started ticking.
    pub fn now(&self) -> f32 {
        self.clock
    }

    pub(crate) fn advance_clock(&mut self, dt: f32) {
        self.clock += dt;
    }

    pub(crate) fn advance_time_in_state(&mut self, dt: f32) {
        self.time_in_state += dt;
    }

    pub(crate) fn reset_time_in_state(&mut self) {
        self.time_in_state = 0.0;
    }

    /// Pulls position and health of the owning unit from the world.
    ///
    /// Returns false (and leaves the context untouched) if the world no
    /// longer knows the unit.
    pub fn refresh_from_world(&mut self) -> bool {
        match self.world.unit(self.unit) {
            Some(me) => {
                self.position = me.position;
                self.set_health_percent(me.health_percent);
                true
            }
            None => false,
        }
    }

    pub fn world(&self) -> &dyn WorldQuery {
        self.world.as_ref()
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // ========================================================================
    // Target
    // ========================================================================

    /// The raw target handle, which may refer to a unit that died since it
    /// was assigned. Prefer [`Self::target`] for decisions.
    pub fn current_target(&self) -> Option<UnitId> {
        self.current_target
    }

    pub fn set_current_target(&mut self, target: Option<UnitId>) {
        self.current_target = target;
    }

    /// The current target, if it is still alive.
    pub fn target(&self) -> Option<UnitSnapshot> {
        self.current_target.and_then(|id| self.world.unit(id))
    }

    /// Distance to the live current target.
    pub fn distance_to_target(&self) -> Option<f32> {
        self.target().map(|t| self.position.distance(t.position))
    }

    /// Clears the target if the world reports it dead or gone.
    /// Returns true if a target was dropped.
    pub fn drop_dead_target(&mut self) -> bool {
        match self.current_target {
            Some(id) if !self.world.is_alive(id) => {
                tracing::trace!("{}: target {} is gone, clearing", self.unit, id);
                self.current_target = None;
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // World helpers
    // ========================================================================

    /// Closest live unit on any other team.
    pub fn nearest_enemy(&self) -> Option<UnitSnapshot> {
        self.world
            .nearest(self.position, TeamFilter::Except(self.team))
            .filter(|u| u.id != self.unit)
    }

    /// Number of live enemies within `radius`.
    pub fn enemies_within(&self, radius: f32) -> usize {
        self.world
            .units_within(self.position, radius, TeamFilter::Except(self.team))
            .iter()
            .filter(|u| u.id != self.unit)
            .count()
    }

    // ========================================================================
    // Threat helpers
    // ========================================================================

    pub fn has_threat_system(&self) -> bool {
        self.threat.is_some()
    }

    /// Threat held by `target`; 0 without a threat system.
    pub fn threat(&self, target: UnitId) -> f32 {
        self.threat.as_ref().map_or(0.0, |t| t.threat(target))
    }

    /// Highest-threat target that is still alive.
    pub fn highest_threat_target(&self) -> Option<UnitId> {
        let threat = self.threat.as_ref()?;
        let top = threat.highest_threat_target()?;
        if self.world.is_alive(top) {
            return Some(top);
        }
        threat
            .threat_list()
            .into_iter()
            .map(|(id, _)| id)
            .find(|id| self.world.is_alive(*id))
    }

    /// Number of tracked threat targets; 0 without a threat system.
    pub fn threat_target_count(&self) -> usize {
        self.threat.as_ref().map_or(0, |t| t.target_count())
    }

    /// Tracked targets, highest threat first; empty without a threat system.
    pub fn threat_list(&self) -> Vec<(UnitId, f32)> {
        self.threat
            .as_ref()
            .map(|t| t.threat_list())
            .unwrap_or_default()
    }

    // ========================================================================
    // Condition scratch state
    // ========================================================================

    pub(crate) fn last_chance_roll(&self, id: ChanceId) -> Option<f32> {
        self.chance_rolls.get(&id).copied()
    }

    pub(crate) fn record_chance_roll(&mut self, id: ChanceId) {
        self.chance_rolls.insert(id, self.clock);
    }
}

impl std::fmt::Debug for BehaviourContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviourContext")
            .field("unit", &self.unit)
            .field("team", &self.team)
            .field("position", &self.position)
            .field("spawn_position", &self.spawn_position)
            .field("current_target", &self.current_target)
            .field("health_percent", &self.health_percent)
            .field("time_in_state", &self.time_in_state)
            .field("clock", &self.clock)
            .field("has_threat_system", &self.has_threat_system())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threat::ThreatManager;
    use crate::world::InMemoryWorld;

    fn setup() -> (Arc<InMemoryWorld>, BehaviourContext) {
        let world = Arc::new(InMemoryWorld::new());
        world.spawn(UnitId(1), TeamId(0), Vec3::ZERO);
        world.spawn(UnitId(2), TeamId(1), Vec3::new(4.0, 0.0, 3.0));
        let ctx = BehaviourContext::new(UnitId(1), TeamId(0), Vec3::ZERO, world.clone());
        (world, ctx)
    }

    #[test]
    fn dead_target_reads_as_no_target() {
        let (world, mut ctx) = setup();
        ctx.set_current_target(Some(UnitId(2)));
        assert_eq!(ctx.distance_to_target(), Some(5.0));

        world.kill(UnitId(2));
        assert!(ctx.target().is_none());
        assert!(ctx.distance_to_target().is_none());
        assert!(ctx.drop_dead_target());
        assert_eq!(ctx.current_target(), None);
    }

    #[test]
    fn threat_accessors_are_neutral_without_threat_system() {
        let (_world, ctx) = setup();
        assert!(!ctx.has_threat_system());
        assert_eq!(ctx.threat(UnitId(2)), 0.0);
        assert_eq!(ctx.highest_threat_target(), None);
        assert_eq!(ctx.threat_target_count(), 0);
        assert!(ctx.threat_list().is_empty());
    }

    #[test]
    fn highest_threat_skips_dead_units() {
        let (world, ctx) = setup();
        world.spawn(UnitId(3), TeamId(1), Vec3::X);
        let threat = Arc::new(ThreatManager::new());
        threat.add_threat(UnitId(2), 50.0);
        threat.add_threat(UnitId(3), 10.0);
        let ctx = ctx.with_threat(threat);

        assert_eq!(ctx.highest_threat_target(), Some(UnitId(2)));
        world.kill(UnitId(2));
        assert_eq!(ctx.highest_threat_target(), Some(UnitId(3)));
    }

    #[test]
    fn refresh_pulls_position_and_health() {
        let (world, mut ctx) = setup();
        world.set_position(UnitId(1), Vec3::new(0.0, 0.0, 12.0));
        world.set_health_percent(UnitId(1), 0.25);

        assert!(ctx.refresh_from_world());
        assert_eq!(ctx.distance_from_spawn(), 12.0);
        assert_eq!(ctx.health_percent(), 0.25);
    }

    #[test]
    fn health_is_clamped() {
        let (_world, mut ctx) = setup();
        ctx.set_health_percent(1.7);
        assert_eq!(ctx.health_percent(), 1.0);
        ctx.set_health_percent(-0.2);
        assert_eq!(ctx.health_percent(), 0.0);
    }
}
