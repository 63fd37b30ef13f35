//! Transition conditions.
//!
//! A [`Condition`] is a boolean predicate over a [`BehaviourContext`].
//! Transitions hold an ordered list of them (implicit AND); the
//! [`Composite`](Condition::Composite) variant nests AND/OR groups and
//! [`Not`](Condition::Not) negates a single child.
//!
//! # Evaluation contract
//!
//! - Evaluation never panics. A missing dependency (no target, target died,
//!   no threat system) makes the predicate `false`, except for
//!   [`HasTargetCondition`] whose whole job is reporting presence.
//! - Evaluation is pure with two documented exceptions:
//!   [`HighestThreatCondition`] may write the current target when
//!   `assign_target` is set, and [`RandomChanceCondition`] records its last
//!   roll time in the evaluating agent's context.
//!
//! The rule set is closed: variants are a tagged enum dispatched by
//! [`Condition::evaluate`], which keeps authored profiles serializable.

mod builder;
mod chance;
mod composite;
mod spatial;
mod threat;
mod vitals;

pub use builder::{all, any, not};
pub use chance::{ChanceId, RandomChanceCondition};
pub use composite::{CompositeCondition, CompositeMode};
pub use spatial::{
    AtSpawnCondition, DistanceCondition, EnemyCountCondition, LeashCondition,
    TooFarFromSpawnCondition,
};
pub use threat::{
    HighestThreatCondition, HighestThreatMode, ThreatComparison, ThreatThresholdCondition,
    ThreatThresholdMode,
};
pub use vitals::{HasTargetCondition, HealthCondition, TimeInStateCondition};

use crate::context::BehaviourContext;

/// A boolean predicate gating a transition.
#[derive(Clone, Debug, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// Always true.
    Always,
    /// Always false.
    Never,
    Distance(DistanceCondition),
    Health(HealthCondition),
    EnemyCount(EnemyCountCondition),
    HasTarget(HasTargetCondition),
    TimeInState(TimeInStateCondition),
    AtSpawn(AtSpawnCondition),
    TooFarFromSpawn(TooFarFromSpawnCondition),
    Leash(LeashCondition),
    RandomChance(RandomChanceCondition),
    ThreatThreshold(ThreatThresholdCondition),
    HighestThreat(HighestThreatCondition),
    Composite(CompositeCondition),
    /// Negates its child.
    Not(Box<Condition>),
}

impl Condition {
    /// Evaluates this condition against the agent's context.
    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Distance(c) => c.evaluate(ctx),
            Condition::Health(c) => c.evaluate(ctx),
            Condition::EnemyCount(c) => c.evaluate(ctx),
            Condition::HasTarget(c) => c.evaluate(ctx),
            Condition::TimeInState(c) => c.evaluate(ctx),
            Condition::AtSpawn(c) => c.evaluate(ctx),
            Condition::TooFarFromSpawn(c) => c.evaluate(ctx),
            Condition::Leash(c) => c.evaluate(ctx),
            Condition::RandomChance(c) => c.evaluate(ctx),
            Condition::ThreatThreshold(c) => c.evaluate(ctx),
            Condition::HighestThreat(c) => c.evaluate(ctx),
            Condition::Composite(c) => c.evaluate(ctx),
            Condition::Not(inner) => !inner.evaluate(ctx),
        }
    }

    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Comparison of a float measurement against a bound or an inclusive range.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Threshold {
    /// `value < bound`
    LessThan(f32),
    /// `value > bound`
    GreaterThan(f32),
    /// `min <= value <= max`
    Between { min: f32, max: f32 },
}

impl Threshold {
    #[inline]
    pub fn matches(self, value: f32) -> bool {
        match self {
            Threshold::LessThan(bound) => value < bound,
            Threshold::GreaterThan(bound) => value > bound,
            Threshold::Between { min, max } => value >= min && value <= max,
        }
    }
}

/// Comparison of a count against a bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CountThreshold {
    LessThan(usize),
    GreaterThan(usize),
    Equals(usize),
}

impl CountThreshold {
    #[inline]
    pub fn matches(self, count: usize) -> bool {
        match self {
            CountThreshold::LessThan(bound) => count < bound,
            CountThreshold::GreaterThan(bound) => count > bound,
            CountThreshold::Equals(bound) => count == bound,
        }
    }
}
