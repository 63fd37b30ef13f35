//! Probabilistic gate with a per-agent cooldown.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use crate::context::BehaviourContext;

static NEXT_CHANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one authored [`RandomChanceCondition`].
///
/// Roll timestamps live in each agent's context keyed by this id, so a
/// profile shared between agents never leaks cooldown state across them.
/// Clones share the id; every construction or deserialization gets a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChanceId(u64);

impl ChanceId {
    pub fn next() -> Self {
        Self(NEXT_CHANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// True with probability `chance`, at most once per `cooldown` seconds.
///
/// A roll consumes the cooldown whether or not it succeeds: after any draw
/// the condition reads false until `cooldown` seconds of agent clock pass.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomChanceCondition {
    /// Probability in `[0, 1]`.
    pub chance: f32,
    /// Seconds between draws.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: f32,
    #[cfg_attr(feature = "serde", serde(skip, default = "ChanceId::next"))]
    id: ChanceId,
}

impl RandomChanceCondition {
    pub fn new(chance: f32, cooldown: f32) -> Self {
        Self {
            chance,
            cooldown,
            id: ChanceId::next(),
        }
    }

    pub fn id(&self) -> ChanceId {
        self.id
    }

    pub fn evaluate(&self, ctx: &mut BehaviourContext) -> bool {
        let cooling_down = ctx
            .last_chance_roll(self.id)
            .is_some_and(|last| ctx.now() - last < self.cooldown);
        if cooling_down {
            return false;
        }

        ctx.record_chance_roll(self.id);
        let roll: f32 = ctx.rng().gen_range(0.0..1.0);
        roll < self.chance
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::{TeamId, UnitId, Vec3};
    use crate::world::InMemoryWorld;

    fn ctx(unit: u64) -> BehaviourContext {
        let world = Arc::new(InMemoryWorld::new());
        BehaviourContext::new(UnitId(unit), TeamId(0), Vec3::ZERO, world)
    }

    #[test]
    fn certain_without_cooldown_always_fires() {
        let mut ctx = ctx(1);
        let cond = RandomChanceCondition::new(1.0, 0.0);
        for _ in 0..20 {
            assert!(cond.evaluate(&mut ctx));
            ctx.advance_clock(0.1);
        }
    }

    #[test]
    fn zero_chance_never_fires() {
        let mut ctx = ctx(1);
        let cond = RandomChanceCondition::new(0.0, 0.0);
        for _ in 0..20 {
            assert!(!cond.evaluate(&mut ctx));
        }
    }

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let mut ctx = ctx(1);
        let cond = RandomChanceCondition::new(1.0, 2.0);

        assert!(cond.evaluate(&mut ctx));
        ctx.advance_clock(1.0);
        assert!(!cond.evaluate(&mut ctx));
        ctx.advance_clock(1.0);
        assert!(cond.evaluate(&mut ctx));
    }

    #[test]
    fn failed_draw_still_consumes_cooldown() {
        let mut ctx = ctx(1);
        let cond = RandomChanceCondition::new(0.0, 5.0);
        assert!(!cond.evaluate(&mut ctx));

        // Same id, same agent: still inside the cooldown window.
        let certain = RandomChanceCondition {
            chance: 1.0,
            ..cond.clone()
        };
        ctx.advance_clock(1.0);
        assert!(!certain.evaluate(&mut ctx));
        ctx.advance_clock(4.0);
        assert!(certain.evaluate(&mut ctx));
    }

    #[test]
    fn cooldowns_are_tracked_per_agent() {
        let cond = RandomChanceCondition::new(1.0, 10.0);
        let mut a = ctx(1);
        let mut b = ctx(2);

        assert!(cond.evaluate(&mut a));
        assert!(!cond.evaluate(&mut a));
        assert!(cond.evaluate(&mut b));
    }

    #[test]
    fn each_construction_gets_a_fresh_id() {
        let a = RandomChanceCondition::new(0.5, 1.0);
        let b = RandomChanceCondition::new(0.5, 1.0);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }
}
