//! Data-driven combat AI for real-time NPCs.
//!
//! Each agent runs a small state machine whose transitions are gated by
//! composable conditions and whose active state picks combat skills through
//! a pluggable selection strategy. Everything is re-evaluated once per
//! simulation tick.
//!
//! - **Shared, immutable profiles**: one [`Profile`] serves any number of agents
//! - **Injected collaborators**: world queries and threat tables are passed
//!   into each [`BehaviourContext`], never looked up globally
//! - **Never fails at runtime**: missing targets or threat data degrade to
//!   "no transition" and "no skill"
//!
//! # Architecture
//!
//! - [`BehaviourContext`]: per-agent blackboard
//! - [`Condition`]: transition predicates, including AND/OR composites
//! - [`SkillSelector`]: skill selection strategies
//! - [`Transition`], [`State`], [`Profile`]: the state graph, built from a
//!   [`ProfileDef`]
//! - [`BehaviourRunner`]: the tick loop
//! - [`ThreatManager`]: a concrete threat table behind [`ThreatSource`]
//! - [`EventBus`], [`SkillTrigger`]: reactive skills on combat events
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use combat_ai::conditions::{Condition, HealthCondition, Threshold};
//! use combat_ai::{
//!     BehaviourContext, BehaviourRunner, InMemoryWorld, ProfileDef, SkillRequest, SkillSelector,
//!     SkillSlot, StateDef, TeamId, TransitionDef, UnitId, Vec3,
//! };
//!
//! let profile = ProfileDef::new("grunt")
//!     .initial("Fight")
//!     .state(
//!         StateDef::new("Fight")
//!             .selector(SkillSelector::FirstAvailable)
//!             .transition(TransitionDef::to("Flee").when(Condition::Health(
//!                 HealthCondition::new(Threshold::LessThan(0.5)),
//!             ))),
//!     )
//!     .state(StateDef::new("Flee"))
//!     .build()
//!     .unwrap();
//!
//! let world = Arc::new(InMemoryWorld::new());
//! world.spawn(UnitId(1), TeamId(0), Vec3::ZERO);
//! let ctx = BehaviourContext::new(UnitId(1), TeamId(0), Vec3::ZERO, world);
//! let mut runner = BehaviourRunner::new(Arc::new(profile), ctx);
//!
//! let skills = vec![SkillSlot::new("Slash", 1.5)];
//! let mut requests: Vec<SkillRequest> = Vec::new();
//! runner.tick(0.1, &skills, &mut requests);
//! assert_eq!(requests[0].skill, "Slash");
//! ```

pub mod conditions;
pub mod context;
pub mod error;
pub mod fsm;
pub mod runner;
pub mod selectors;
pub mod skill;
pub mod threat;
pub mod triggers;
pub mod types;
pub mod world;

// Re-export core types for ergonomic API
pub use conditions::Condition;
pub use context::BehaviourContext;
pub use error::ProfileError;
pub use fsm::{Profile, ProfileDef, ResolvedTransition, State, StateDef, StateId, Transition, TransitionDef};
pub use runner::{BehaviourRunner, StateChange, StateObserver, TickReport};
pub use selectors::SkillSelector;
pub use skill::{CombatSink, DiscardSink, Skill, SkillRequest, SkillSlot};
pub use threat::{ThreatManager, ThreatSource};
pub use triggers::{
    CombatEvent, EventBus, SkillTrigger, Subscription, SubscriptionId, TriggerKind, TriggerScope,
};
pub use types::{TeamId, UnitId, Vec3, approximately};
pub use world::{InMemoryWorld, TeamFilter, UnitSnapshot, WorldQuery};
