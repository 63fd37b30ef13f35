//! Headless arena for combat AI profiles.
//!
//! Spawns teams of agents driven by [`combat_ai::BehaviourRunner`]s, resolves
//! the skills they request and reports who is left standing.

pub mod config;
pub mod logging;
pub mod sim;

pub use config::{ArenaConfig, SkillConfig, TeamConfig};
pub use sim::{Agent, Arena, ArenaStats, ArenaSummary};
