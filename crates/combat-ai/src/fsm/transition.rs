use crate::conditions::Condition;
use crate::context::BehaviourContext;

use super::StateId;

/// A guarded edge to `target`.
///
/// Conditions are an implicit AND evaluated in order with short-circuit.
/// An empty list is unconditionally satisfied.
#[derive(Clone, Debug)]
pub struct Transition {
    pub(crate) target: StateId,
    pub(crate) priority: i32,
    pub(crate) conditions: Vec<Condition>,
}

impl Transition {
    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_satisfied(&self, ctx: &mut BehaviourContext) -> bool {
        self.conditions.iter().all(|c| c.evaluate(ctx))
    }
}
