//! Shorthand constructors for nested conditions.
//!
//! Instead of writing `Condition::Composite(CompositeCondition::and(vec![...]))`
//! use `all(vec![...])`.

use super::{CompositeCondition, Condition};

/// AND of `conditions`.
///
/// Shorthand for `Condition::Composite(CompositeCondition::and(conditions))`.
#[inline]
pub fn all(conditions: Vec<Condition>) -> Condition {
    Condition::Composite(CompositeCondition::and(conditions))
}

/// OR of `conditions`.
///
/// Shorthand for `Condition::Composite(CompositeCondition::or(conditions))`.
#[inline]
pub fn any(conditions: Vec<Condition>) -> Condition {
    Condition::Composite(CompositeCondition::or(conditions))
}

/// Negation of `condition`.
#[inline]
pub fn not(condition: Condition) -> Condition {
    Condition::Not(Box::new(condition))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::BehaviourContext;
    use crate::types::{TeamId, UnitId, Vec3};
    use crate::world::InMemoryWorld;

    #[test]
    fn helpers_compose() {
        let world = Arc::new(InMemoryWorld::new());
        let mut ctx = BehaviourContext::new(UnitId(1), TeamId(0), Vec3::ZERO, world);

        let cond = all(vec![not(Condition::Never), any(vec![Condition::Never, Condition::Always])]);
        assert!(cond.evaluate(&mut ctx));
        assert!(!not(cond).evaluate(&mut ctx));
    }
}
