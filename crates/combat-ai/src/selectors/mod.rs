//! Skill selection strategies.
//!
//! A [`SkillSelector`] picks at most one skill from the candidates an agent
//! currently has. Strategies never return an on-cooldown skill, with one
//! documented exception: [`WeightedRandomSelector`] with
//! `require_off_cooldown = false`.
//!
//! An empty candidate list, or missing context a strategy depends on (no live
//! target for [`DistanceBandedSelector`]), yields `None`.

mod banded;
mod ordered;
mod weighted;

pub use banded::{DistanceBandedSelector, DistanceRange, HealthBandedSelector, HealthRange};
pub use ordered::{PriorityEntry, PrioritySelector};
pub use weighted::{WeightedEntry, WeightedRandomSelector};

use crate::context::BehaviourContext;
use crate::skill::Skill;

/// Strategy a state uses to choose its next skill.
#[derive(Clone, Debug, PartialEq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillSelector {
    /// First candidate (input order) that is off cooldown.
    FirstAvailable,
    Priority(PrioritySelector),
    DistanceBanded(DistanceBandedSelector),
    HealthBanded(HealthBandedSelector),
    WeightedRandom(WeightedRandomSelector),
}

impl SkillSelector {
    /// Chooses a skill from `skills`.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The agent's context (distance, health, RNG)
    /// * `skills` - The agent's candidate skills, in the agent's own order
    ///
    /// # Returns
    ///
    /// A reference into `skills`, or `None` when nothing qualifies.
    pub fn select<'s, S: Skill>(
        &self,
        ctx: &mut BehaviourContext,
        skills: &'s [S],
    ) -> Option<&'s S> {
        if skills.is_empty() {
            return None;
        }

        let picked = match self {
            SkillSelector::FirstAvailable => first_ready(skills),
            SkillSelector::Priority(s) => s.select(skills),
            SkillSelector::DistanceBanded(s) => s.select(ctx, skills),
            SkillSelector::HealthBanded(s) => s.select(ctx, skills),
            SkillSelector::WeightedRandom(s) => s.select(ctx, skills),
        };

        match picked {
            Some(skill) => tracing::debug!(
                "{}: {} selector picked {}",
                ctx.unit(),
                self.kind(),
                skill.name()
            ),
            None => tracing::trace!("{}: {} selector found nothing", ctx.unit(), self.kind()),
        }

        picked
    }

    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

/// First candidate that is off cooldown.
pub(crate) fn first_ready<S: Skill>(skills: &[S]) -> Option<&S> {
    skills.iter().find(|s| !s.is_on_cooldown())
}

/// First candidate named `name` that is off cooldown.
pub(crate) fn ready_named<'s, S: Skill>(skills: &'s [S], name: &str) -> Option<&'s S> {
    skills
        .iter()
        .find(|s| s.name() == name && !s.is_on_cooldown())
}

/// First ready candidate matching any of `names`, trying names in order.
pub(crate) fn first_ready_of<'s, S: Skill>(skills: &'s [S], names: &[String]) -> Option<&'s S> {
    names.iter().find_map(|name| ready_named(skills, name))
}


#[cfg(test)]
mod tests {
    use super::test_support::{ctx, slots};
    use super::*;
    use crate::skill::SkillSlot;

    #[test]
    fn first_available_skips_cooldowns() {
        let (_w, mut ctx) = ctx();
        let skills = vec![
            SkillSlot::new("Bite", 1.0).cooling_down(0.5),
            SkillSlot::new("Claw", 1.0),
            SkillSlot::new("Roar", 1.0),
        ];
        let picked = SkillSelector::FirstAvailable.select(&mut ctx, &skills);
        assert_eq!(picked.map(|s| s.name()), Some("Claw"));
    }

    #[test]
    fn empty_candidates_yield_none() {
        let (_w, mut ctx) = ctx();
        let skills: Vec<SkillSlot> = Vec::new();
        assert!(SkillSelector::FirstAvailable.select(&mut ctx, &skills).is_none());

        let weighted = SkillSelector::WeightedRandom(WeightedRandomSelector::new(vec![
            WeightedEntry::new("Bite", 1.0),
        ]));
        assert!(weighted.select(&mut ctx, &skills).is_none());
    }

    #[test]
    fn all_on_cooldown_yields_none() {
        let (_w, mut ctx) = ctx();
        let skills: Vec<SkillSlot> = slots(&["Bite", "Claw"])
            .into_iter()
            .map(|s| s.cooling_down(1.0))
            .collect();
        assert!(SkillSelector::FirstAvailable.select(&mut ctx, &skills).is_none());
    }

    #[test]
    fn kind_names_variants() {
        assert_eq!(SkillSelector::FirstAvailable.kind(), "FirstAvailable");
        let priority = SkillSelector::Priority(PrioritySelector::new(vec![]));
        assert_eq!(priority.kind(), "Priority");
    }
}
