//! Spatial conditions: distance to target, enemy density, spawn tethering.

use crate::context::BehaviourContext;

use super::{CountThreshold, Threshold};

/// Compares the distance to the current target (or to the nearest enemy)
/// against a [`Threshold`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceCondition {
    pub threshold: Threshold,
    /// Measure to the nearest live enemy instead of the current target.
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_nearest_enemy: bool,
}

impl DistanceCondition {
    pub fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            use_nearest_enemy: false,
        }
    }

    /// Measure against the nearest enemy (builder pattern).
    #[must_use]
    pub fn against_nearest_enemy(mut self) -> Self {
        self.use_nearest_enemy = true;
        self
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        let distance = if self.use_nearest_enemy {
            ctx.nearest_enemy()
                .map(|enemy| ctx.position().distance(enemy.position))
        } else {
            ctx.distance_to_target()
        };

        match distance {
            Some(d) => self.threshold.matches(d),
            None => {
                tracing::trace!("{}: distance condition has nothing to measure", ctx.unit());
                false
            }
        }
    }
}

/// Counts live enemies within a detection radius.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyCountCondition {
    pub radius: f32,
    pub threshold: CountThreshold,
}

impl EnemyCountCondition {
    pub fn new(radius: f32, threshold: CountThreshold) -> Self {
        Self { radius, threshold }
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        self.threshold.matches(ctx.enemies_within(self.radius))
    }
}

/// True once the agent strays beyond its leash radius.
///
/// Soft constraint: typically drives a "return to spawn" state while still
/// allowing combat near the edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeashCondition {
    pub leash_radius: f32,
}

impl LeashCondition {
    pub fn new(leash_radius: f32) -> Self {
        Self { leash_radius }
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        ctx.distance_from_spawn() > self.leash_radius
    }
}

/// True once the agent is farther than `reset_distance` from spawn.
///
/// Hard constraint: typically forces an evade/reset regardless of combat.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TooFarFromSpawnCondition {
    pub reset_distance: f32,
}

impl TooFarFromSpawnCondition {
    pub fn new(reset_distance: f32) -> Self {
        Self { reset_distance }
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        ctx.distance_from_spawn() > self.reset_distance
    }
}

/// True while the agent is within `tolerance` of its spawn point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtSpawnCondition {
    pub tolerance: f32,
}

impl AtSpawnCondition {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        ctx.distance_from_spawn() <= self.tolerance
    }
}
