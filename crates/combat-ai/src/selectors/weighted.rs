//! Weighted random selection.

use rand::Rng;

use crate::context::BehaviourContext;
use crate::skill::Skill;

/// One `(skill, weight)` pair. Negative and non-finite weights count as zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedEntry {
    pub skill: String,
    pub weight: f32,
}

impl WeightedEntry {
    pub fn new(skill: impl Into<String>, weight: f32) -> Self {
        Self {
            skill: skill.into(),
            weight,
        }
    }
}

/// Draws one listed skill with probability proportional to its weight.
///
/// The draw uses the agent's own RNG, so results are reproducible per seed.
/// With `require_off_cooldown` unset, entries are filtered only by presence
/// and an on-cooldown skill may be returned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedRandomSelector {
    pub entries: Vec<WeightedEntry>,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub require_off_cooldown: bool,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl WeightedRandomSelector {
    pub fn new(entries: Vec<WeightedEntry>) -> Self {
        Self {
            entries,
            require_off_cooldown: true,
        }
    }

    /// Allow picking skills that are still cooling down (builder pattern).
    #[must_use]
    pub fn ignoring_cooldowns(mut self) -> Self {
        self.require_off_cooldown = false;
        self
    }

    pub fn select<'s, S: Skill>(
        &self,
        ctx: &mut BehaviourContext,
        skills: &'s [S],
    ) -> Option<&'s S> {
        let eligible: Vec<(&'s S, f32)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                skills
                    .iter()
                    .find(|s| {
                        s.name() == entry.skill
                            && (!self.require_off_cooldown || !s.is_on_cooldown())
                    })
                    .map(|skill| (skill, effective_weight(entry.weight)))
            })
            .collect();

        let (first, _) = *eligible.first()?;
        let total: f32 = eligible.iter().map(|(_, w)| w).sum();
        // Finite weights can still overflow the sum.
        if !total.is_finite() || total <= 0.0 {
            return Some(first);
        }

        let mut roll = ctx.rng().gen_range(0.0..total);
        for (skill, weight) in &eligible {
            if roll < *weight {
                return Some(*skill);
            }
            roll -= weight;
        }

        // Float drift past the last bucket.
        eligible.last().map(|(skill, _)| *skill)
    }
}

fn effective_weight(weight: f32) -> f32 {
    if weight.is_finite() { weight.max(0.0) } else { 0.0 }
}
