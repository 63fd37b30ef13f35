//! Headless skirmish simulation.
//!
//! The arena owns the world, the event bus and one [`Agent`] per unit. Each
//! tick runs four phases:
//!
//! 1. **Sense** - refresh contexts from the world, maintain threat tables
//! 2. **Think** - tick every runner (in parallel with the `parallel` feature)
//! 3. **Act** - resolve skill requests in agent order, publish combat events
//! 4. **Move** - steer each agent according to its active state
//!
//! Runners only read shared state while thinking, so the outcome for a given
//! seed does not depend on how the think phase is scheduled.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use combat_ai::{
    BehaviourContext, BehaviourRunner, CombatEvent, EventBus, InMemoryWorld, Skill, SkillRequest,
    SkillSlot, TeamFilter, TeamId, ThreatManager, UnitId, Vec3, WorldQuery,
};
use combat_content::ProfileRegistry;

use crate::config::{ArenaConfig, SkillConfig};

/// Threat gained per second from an enemy standing inside the aggro radius.
const PROXIMITY_THREAT_PER_SECOND: f32 = 1.0;
/// Threat gained per unit of max health taken as damage.
const DAMAGE_THREAT: f32 = 100.0;

/// States that walk the agent back to its spawn point.
const RETREAT_STATES: &[&str] = &["Evade", "Return"];
/// States that back away from the target.
const FLEE_STATES: &[&str] = &["Flee"];
/// States that hold position.
const HOLD_STATES: &[&str] = &["Idle", "Guard"];

/// One simulated unit: a runner plus the skills and effects it can use.
#[derive(Debug)]
pub struct Agent {
    runner: BehaviourRunner,
    threat: Arc<ThreatManager>,
    skills: Vec<SkillSlot>,
    effects: HashMap<String, SkillConfig>,
    engage_range: f32,
    requests: Vec<SkillRequest>,
    transitioned: bool,
    alive: bool,
}

impl Agent {
    pub fn unit(&self) -> UnitId {
        self.runner.unit()
    }

    pub fn team(&self) -> TeamId {
        self.runner.context().team()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn state_name(&self) -> &str {
        self.runner.current_state_name()
    }

    pub fn runner(&self) -> &BehaviourRunner {
        &self.runner
    }

    pub fn threat(&self) -> &ThreatManager {
        &self.threat
    }

    pub fn skills(&self) -> &[SkillSlot] {
        &self.skills
    }

    fn think(&mut self, dt: f32) {
        self.requests.clear();
        let report = self.runner.tick(dt, &self.skills, &mut self.requests);
        self.transitioned = report.transition.is_some();
    }
}

/// Running totals over a simulation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub ticks: u64,
    pub transitions: u64,
    /// Requests that resolved into an effect.
    pub skills_used: u64,
    /// Requests dropped (skill cooling down, target dead or out of range).
    pub skills_ignored: u64,
    pub hits: u64,
    pub heals: u64,
    pub deaths: u64,
}

/// Outcome of [`Arena::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaSummary {
    pub stats: ArenaStats,
    /// Live units per team, in team order.
    pub survivors: Vec<(TeamId, usize)>,
    /// The only team left standing, if the fight was decided.
    pub winner: Option<TeamId>,
}

pub struct Arena {
    config: ArenaConfig,
    world: Arc<InMemoryWorld>,
    bus: Arc<EventBus>,
    agents: Vec<Agent>,
    index: HashMap<UnitId, usize>,
    teams: Vec<TeamId>,
    stats: ArenaStats,
}

impl Arena {
    /// Builds an arena, loading profiles from `profile_dir` or falling back
    /// to the built-in set.
    pub fn from_config(config: ArenaConfig) -> Result<Self> {
        let registry = match &config.profile_dir {
            Some(dir) => ProfileRegistry::load_dir(dir)?,
            None => ProfileRegistry::builtin()?,
        };
        Self::new(config, &registry)
    }

    /// Spawns every team and wires each agent's triggers to the event bus.
    pub fn new(config: ArenaConfig, registry: &ProfileRegistry) -> Result<Self> {
        config.validate()?;

        let world = Arc::new(InMemoryWorld::new());
        let bus = Arc::new(EventBus::new());
        let mut agents = Vec::new();
        let mut index = HashMap::new();
        let mut teams = Vec::with_capacity(config.teams.len());
        let mut next_id = 1u64;

        for (team_index, team_config) in config.teams.iter().enumerate() {
            let team = TeamId(team_index as u32);
            teams.push(team);

            let profile = registry.get(&team_config.profile).ok_or_else(|| {
                anyhow!(
                    "Unknown profile '{}' (available: {})",
                    team_config.profile,
                    registry.names().join(", ")
                )
            })?;

            let effects: HashMap<String, SkillConfig> = team_config
                .skills
                .iter()
                .map(|skill| (skill.name.clone(), skill.clone()))
                .collect();
            let engage_range = team_config
                .skills
                .iter()
                .filter(|skill| skill.damage > 0.0)
                .map(|skill| skill.range)
                .fold(f32::INFINITY, f32::min);
            let engage_range = if engage_range.is_finite() {
                engage_range
            } else {
                2.0
            };

            let center = Vec3::from_array(team_config.spawn);
            let half_span = (team_config.size.saturating_sub(1)) as f32 / 2.0;

            for slot in 0..team_config.size {
                let unit = UnitId(next_id);
                next_id += 1;

                let offset = (slot as f32 - half_span) * team_config.spacing;
                let spawn = center + Vec3::new(0.0, 0.0, offset);
                world.spawn(unit, team, spawn);

                let threat = Arc::new(ThreatManager::new());
                let ctx = BehaviourContext::new(unit, team, spawn, world.clone())
                    .with_threat(threat.clone())
                    .with_seed(agent_seed(config.seed, unit));
                let mut runner = BehaviourRunner::new(profile.clone(), ctx);
                runner.enable_triggers(&bus);

                let skills = team_config
                    .skills
                    .iter()
                    .map(|skill| SkillSlot::new(skill.name.as_str(), skill.cooldown))
                    .collect();

                index.insert(unit, agents.len());
                agents.push(Agent {
                    runner,
                    threat,
                    skills,
                    effects: effects.clone(),
                    engage_range,
                    requests: Vec::new(),
                    transitioned: false,
                    alive: true,
                });
            }

            tracing::info!(
                "Spawned team {} ({} x {}) at {:?}",
                team.0,
                team_config.size,
                profile.name(),
                team_config.spawn
            );
        }

        Ok(Self {
            config,
            world,
            bus,
            agents,
            index,
            teams,
            stats: ArenaStats::default(),
        })
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn world(&self) -> &Arc<InMemoryWorld> {
        &self.world
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, unit: UnitId) -> Option<&Agent> {
        self.index.get(&unit).and_then(|&i| self.agents.get(i))
    }

    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// Live units per team, in team order.
    pub fn survivors(&self) -> Vec<(TeamId, usize)> {
        self.teams
            .iter()
            .map(|&team| (team, self.world.alive_count(team)))
            .collect()
    }

    /// True once at most one team has live units.
    pub fn is_decided(&self) -> bool {
        self.survivors().iter().filter(|(_, n)| *n > 0).count() <= 1
    }

    /// Runs until the fight is decided or the tick budget is spent.
    pub fn run(&mut self) -> ArenaSummary {
        let report_every = (self.config.tick_rate.round() as u64).max(1) * 10;

        while self.stats.ticks < self.config.ticks {
            if !self.step() {
                break;
            }
            if self.stats.ticks % report_every == 0 {
                tracing::debug!(
                    "tick {}: survivors {:?}, {} skills used",
                    self.stats.ticks,
                    self.survivors(),
                    self.stats.skills_used
                );
            }
        }

        self.summary()
    }

    pub fn summary(&self) -> ArenaSummary {
        let survivors = self.survivors();
        let mut standing = survivors.iter().filter(|(_, n)| *n > 0);
        let winner = match (standing.next(), standing.next()) {
            (Some((team, _)), None) => Some(*team),
            _ => None,
        };
        ArenaSummary {
            stats: self.stats.clone(),
            survivors,
            winner,
        }
    }

    /// Advances the simulation by one tick. Returns false once the fight is
    /// decided.
    pub fn step(&mut self) -> bool {
        let dt = self.config.dt();

        self.sense(dt);
        self.think(dt);
        self.act();
        self.steer(dt);
        self.reap();

        self.stats.ticks += 1;
        !self.is_decided()
    }

    fn sense(&mut self, dt: f32) {
        let world = self.world.as_ref();
        for agent in self.agents.iter_mut().filter(|a| a.alive) {
            for skill in &mut agent.skills {
                skill.tick(dt);
            }

            let ctx = agent.runner.context_mut();
            ctx.refresh_from_world();
            let position = ctx.position();
            let team = ctx.team();

            agent.threat.prune_dead(world);
            agent.threat.decay(dt, self.config.threat_decay);

            let mut nearby =
                world.units_within(position, self.config.aggro_radius, TeamFilter::Except(team));
            nearby.sort_by_key(|unit| unit.id);
            for enemy in nearby {
                let closeness = 1.0 - position.distance(enemy.position) / self.config.aggro_radius;
                agent.threat.add_threat(
                    enemy.id,
                    PROXIMITY_THREAT_PER_SECOND * dt * closeness.max(0.1),
                );
            }
        }
    }

    fn think(&mut self, dt: f32) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.agents
                .par_iter_mut()
                .filter(|agent| agent.alive)
                .for_each(|agent| agent.think(dt));
        }

        #[cfg(not(feature = "parallel"))]
        self.agents
            .iter_mut()
            .filter(|agent| agent.alive)
            .for_each(|agent| agent.think(dt));
    }

    fn act(&mut self) {
        let mut requests = Vec::new();
        for agent in &mut self.agents {
            if agent.transitioned {
                self.stats.transitions += 1;
                agent.transitioned = false;
            }
            requests.append(&mut agent.requests);
        }

        for request in requests {
            if self.resolve(&request) {
                self.stats.skills_used += 1;
            } else {
                self.stats.skills_ignored += 1;
            }
        }
    }

    /// Applies one request. Returns false if it was dropped; a dropped
    /// request does not start the skill's cooldown.
    fn resolve(&mut self, request: &SkillRequest) -> bool {
        let Some(&caster_index) = self.index.get(&request.caster) else {
            return false;
        };
        let Some(caster) = self.agents.get(caster_index) else {
            return false;
        };
        if !caster.alive || !self.world.is_alive(request.caster) {
            return false;
        }
        let Some(effect) = caster.effects.get(&request.skill).cloned() else {
            tracing::trace!("{}: no effect for {}", request.caster, request.skill);
            return false;
        };
        let ready = caster
            .skills
            .iter()
            .any(|slot| slot.name() == request.skill && !slot.is_on_cooldown());
        if !ready {
            return false;
        }

        if effect.damage > 0.0 {
            if !self.land_hit(request, &effect) {
                return false;
            }
        } else if effect.heal > 0.0 {
            let health = self
                .world
                .unit(request.caster)
                .map_or(0.0, |me| me.health_percent);
            self.world
                .set_health_percent(request.caster, health + effect.heal);
            self.bus.publish(&CombatEvent::Healed {
                target: request.caster,
                amount: effect.heal,
            });
            self.stats.heals += 1;
        } else {
            tracing::trace!("{} uses {}", request.caster, request.skill);
        }

        if let Some(slot) = self
            .agents
            .get_mut(caster_index)
            .and_then(|caster| caster.skills.iter_mut().find(|s| s.name() == request.skill))
        {
            slot.trigger();
        }
        true
    }

    fn land_hit(&mut self, request: &SkillRequest, effect: &SkillConfig) -> bool {
        let Some(target) = request.target else {
            return false;
        };
        let (Some(caster), Some(victim)) = (self.world.unit(request.caster), self.world.unit(target))
        else {
            return false;
        };
        if caster.position.distance(victim.position) > effect.range {
            tracing::trace!(
                "{}: {} out of range of {}",
                request.caster,
                request.skill,
                target
            );
            return false;
        }

        let died = self.world.apply_damage(target, effect.damage);
        if let Some(victim_agent) = self.index.get(&target).and_then(|&i| self.agents.get(i)) {
            victim_agent
                .threat
                .add_threat(request.caster, effect.damage * DAMAGE_THREAT);
        }
        self.stats.hits += 1;
        tracing::debug!(
            "{} hits {} with {} for {:.2}",
            request.caster,
            target,
            request.skill,
            effect.damage
        );

        self.bus.publish(&CombatEvent::Damaged {
            target,
            source: Some(request.caster),
            amount: effect.damage,
        });
        if died {
            tracing::info!("{} killed by {}", target, request.caster);
            self.stats.deaths += 1;
            self.bus.publish(&CombatEvent::Died {
                unit: target,
                team: victim.team,
            });
        }
        true
    }

    fn steer(&mut self, dt: f32) {
        let max_step = self.config.move_speed * dt;
        for agent in self.agents.iter_mut().filter(|a| a.alive) {
            let unit = agent.runner.unit();
            if !self.world.is_alive(unit) {
                continue;
            }
            let state = agent.runner.current_state_name();
            let ctx = agent.runner.context();
            let position = ctx.position();
            let target = ctx.target().map(|t| t.position);

            let destination = if RETREAT_STATES.contains(&state) {
                Some((ctx.spawn_position(), 0.0))
            } else if FLEE_STATES.contains(&state) {
                target.map(|from| {
                    let away = (position - from).normalize_or_zero();
                    (position + away * max_step, 0.0)
                })
            } else if HOLD_STATES.contains(&state) {
                None
            } else {
                target.map(|to| (to, agent.engage_range * 0.8))
            };

            let Some((goal, stop_at)) = destination else {
                continue;
            };
            let remaining = position.distance(goal) - stop_at;
            if remaining <= 0.0 {
                continue;
            }
            let next = position + (goal - position).normalize_or_zero() * remaining.min(max_step);
            self.world.set_position(unit, next);
            agent.runner.context_mut().set_position(next);
        }
    }

    fn reap(&mut self) {
        for agent in self.agents.iter_mut().filter(|a| a.alive) {
            if !self.world.is_alive(agent.runner.unit()) {
                agent.alive = false;
                agent.runner.disable_triggers();
                tracing::debug!(
                    "{} removed from play in state {}",
                    agent.runner.unit(),
                    agent.runner.current_state_name()
                );
            }
        }
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("agents", &self.agents.len())
            .field("teams", &self.teams)
            .field("stats", &self.stats)
            .finish()
    }
}

fn agent_seed(seed: u64, unit: UnitId) -> u64 {
    seed ^ unit.0.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
