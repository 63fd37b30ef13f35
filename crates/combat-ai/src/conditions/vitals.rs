//! Conditions over the agent's own state: health, target presence, timing.

use crate::context::BehaviourContext;

use super::Threshold;

/// Compares the agent's health fraction against a [`Threshold`].
///
/// # Example
///
/// ```rust
/// use combat_ai::conditions::{HealthCondition, Threshold};
///
/// // Flee below half health
/// let low_health = HealthCondition::new(Threshold::LessThan(0.5));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthCondition {
    pub threshold: Threshold,
}

impl HealthCondition {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        self.threshold.matches(ctx.health_percent())
    }
}

/// Tests whether the agent has a target.
///
/// Returns `has_target == should_have_target`, so the same condition type
/// expresses both "engage when a target exists" and "go idle once the target
/// is gone".
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HasTargetCondition {
    pub should_have_target: bool,
    /// Count a target only if it is still alive. When false, a stale handle
    /// to a dead unit still counts as "having a target".
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub require_alive: bool,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl HasTargetCondition {
    /// True while the agent has a live target.
    pub fn present() -> Self {
        Self {
            should_have_target: true,
            require_alive: true,
        }
    }

    /// True while the agent has no live target.
    pub fn absent() -> Self {
        Self {
            should_have_target: false,
            require_alive: true,
        }
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        let has_target = if self.require_alive {
            ctx.target().is_some()
        } else {
            ctx.current_target().is_some()
        };
        has_target == self.should_have_target
    }
}

/// Compares time spent in the active state against a [`Threshold`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeInStateCondition {
    pub threshold: Threshold,
}

impl TimeInStateCondition {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        self.threshold.matches(ctx.time_in_state())
    }
}
