//! AND/OR grouping of conditions.

use crate::context::BehaviourContext;

use super::Condition;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompositeMode {
    And,
    Or,
}

/// Combines child conditions with AND or OR.
///
/// Empty slots (`None`) are skipped, so authored data with holes still
/// evaluates. An AND group with no present children is false; so is an OR
/// group. Children are evaluated left to right and short-circuit.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeCondition {
    pub mode: CompositeMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<Option<Condition>>,
}

impl CompositeCondition {
    pub fn new(mode: CompositeMode, conditions: Vec<Condition>) -> Self {
        Self {
            mode,
            conditions: conditions.into_iter().map(Some).collect(),
        }
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Self::new(CompositeMode::And, conditions)
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self::new(CompositeMode::Or, conditions)
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        let mut present = self.conditions.iter().flatten().peekable();

        match self.mode {
            CompositeMode::And => {
                if present.peek().is_none() {
                    return false;
                }
                present.all(|c| c.evaluate(ctx))
            }
            CompositeMode::Or => present.any(|c| c.evaluate(ctx)),
        }
    }
}
