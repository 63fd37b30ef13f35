//! Threat-table conditions.
//!
//! Both variants read the agent's threat table through the context and are
//! `false` when the agent has no threat system attached.

use crate::context::BehaviourContext;
use crate::types::{UnitId, approximately};

/// Which question [`HighestThreatCondition`] answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HighestThreatMode {
    /// Is the current target the top-threat unit?
    #[default]
    CurrentIsHighest,
    /// Does any top-threat unit exist?
    AnyHighest,
}

/// Checks the top of the threat table, optionally retargeting onto it.
///
/// With `assign_target` set, evaluation writes the highest-threat unit into
/// the context's current target before answering. This is the one condition
/// that mutates shared decision state, so the behaviour is opt-in per usage.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighestThreatCondition {
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: HighestThreatMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub assign_target: bool,
}

impl HighestThreatCondition {
    pub fn new(mode: HighestThreatMode) -> Self {
        Self {
            mode,
            assign_target: false,
        }
    }

    /// Write the highest-threat unit into the current target (builder pattern).
    #[must_use]
    pub fn assigning_target(mut self) -> Self {
        self.assign_target = true;
        self
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        if !ctx.has_threat_system() || ctx.threat_target_count() == 0 {
            return false;
        }

        let Some(highest) = ctx.highest_threat_target() else {
            return false;
        };

        if self.assign_target && ctx.current_target() != Some(highest) {
            tracing::debug!(
                "{}: retargeting onto highest threat {}",
                ctx.unit(),
                highest
            );
            ctx.set_current_target(Some(highest));
        }

        match self.mode {
            HighestThreatMode::CurrentIsHighest => ctx.current_target() == Some(highest),
            HighestThreatMode::AnyHighest => true,
        }
    }
}

/// What [`ThreatThresholdCondition`] measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThreatThresholdMode {
    /// Threat held by the current target.
    CurrentTarget,
    /// True if any tracked target satisfies the comparison.
    AnyTarget,
    /// Number of tracked targets.
    TargetCount,
    /// Highest threat value in the table.
    HighestValue,
}

/// Five-way float comparison. `Equal` (and the equal half of `<=`/`>=`) uses
/// approximate equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThreatComparison {
    Less,
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Greater,
}

impl ThreatComparison {
    #[inline]
    pub fn compare(self, value: f32, threshold: f32) -> bool {
        match self {
            ThreatComparison::Less => value < threshold,
            ThreatComparison::LessOrEqual => value < threshold || approximately(value, threshold),
            ThreatComparison::Equal => approximately(value, threshold),
            ThreatComparison::GreaterOrEqual => {
                value > threshold || approximately(value, threshold)
            }
            ThreatComparison::Greater => value > threshold,
        }
    }
}

/// Compares some aspect of the threat table against a threshold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreatThresholdCondition {
    pub mode: ThreatThresholdMode,
    pub comparison: ThreatComparison,
    pub threshold: f32,
}

impl ThreatThresholdCondition {
    pub fn new(mode: ThreatThresholdMode, comparison: ThreatComparison, threshold: f32) -> Self {
        Self {
            mode,
            comparison,
            threshold,
        }
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        if !ctx.has_threat_system() {
            return false;
        }

        match self.mode {
            ThreatThresholdMode::CurrentTarget => match ctx.target() {
                Some(target) => self.test(ctx.threat(target.id)),
                None => false,
            },
            ThreatThresholdMode::AnyTarget => live_threats(ctx).any(|(_, value)| self.test(value)),
            ThreatThresholdMode::TargetCount => self.test(ctx.threat_target_count() as f32),
            ThreatThresholdMode::HighestValue => match live_threats(ctx).next() {
                Some((_, value)) => self.test(value),
                None => false,
            },
        }
    }

    #[inline]
    fn test(&self, value: f32) -> bool {
        self.comparison.compare(value, self.threshold)
    }
}

/// Threat entries for units still alive, highest first. Dead units linger in
/// the table until it is pruned.
fn live_threats(ctx: &BehaviourContext) -> impl Iterator<Item = (UnitId, f32)> + '_ {
    ctx.threat_list()
        .into_iter()
        .filter(|(id, _)| ctx.world().is_alive(*id))
}
