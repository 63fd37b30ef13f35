//! Range-banded selection keyed on distance to target or on health.

use crate::context::BehaviourContext;
use crate::skill::Skill;

use super::{first_ready, first_ready_of};

// ============================================================================
// Distance bands
// ============================================================================

/// Inclusive distance band with the skills to try inside it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceRange {
    pub min: f32,
    pub max: f32,
    pub skills: Vec<String>,
}

impl DistanceRange {
    pub fn new(min: f32, max: f32, skills: &[&str]) -> Self {
        Self {
            min,
            max,
            skills: skills.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[inline]
    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.min && distance <= self.max
    }
}

/// Picks skills by the distance to the current target.
///
/// Ranges are visited by ascending `min` (authored order for ties), so with
/// overlapping bands the closer band wins. Inside a band, skill names are
/// tried in listed order.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceBandedSelector {
    pub ranges: Vec<DistanceRange>,
    /// When no band yields a skill, take the first ready candidate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fallback_to_any: bool,
}

impl DistanceBandedSelector {
    pub fn new(ranges: Vec<DistanceRange>) -> Self {
        Self {
            ranges,
            fallback_to_any: false,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self) -> Self {
        self.fallback_to_any = true;
        self
    }

    pub fn select<'s, S: Skill>(&self, ctx: &BehaviourContext, skills: &'s [S]) -> Option<&'s S> {
        let Some(distance) = ctx.distance_to_target() else {
            tracing::trace!("{}: distance bands need a live target", ctx.unit());
            return None;
        };

        let mut order: Vec<&DistanceRange> = self.ranges.iter().collect();
        order.sort_by(|a, b| a.min.total_cmp(&b.min));

        let banded = order
            .into_iter()
            .filter(|range| range.contains(distance))
            .find_map(|range| first_ready_of(skills, &range.skills));

        match banded {
            Some(skill) => Some(skill),
            None if self.fallback_to_any => first_ready(skills),
            None => None,
        }
    }
}

// ============================================================================
// Health bands
// ============================================================================

/// Inclusive health band. Higher `priority` bands are tried first when
/// several contain the current health.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthRange {
    pub min: f32,
    pub max: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
    pub skills: Vec<String>,
}

impl HealthRange {
    pub fn new(min: f32, max: f32, priority: i32, skills: &[&str]) -> Self {
        Self {
            min,
            max,
            priority,
            skills: skills.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[inline]
    pub fn contains(&self, health_percent: f32) -> bool {
        health_percent >= self.min && health_percent <= self.max
    }
}

/// Picks skills by the agent's health fraction.
///
/// Matching ranges are visited by descending `priority`, then ascending
/// `min`, then authored order.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthBandedSelector {
    pub ranges: Vec<HealthRange>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fallback_to_any: bool,
}

impl HealthBandedSelector {
    pub fn new(ranges: Vec<HealthRange>) -> Self {
        Self {
            ranges,
            fallback_to_any: false,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self) -> Self {
        self.fallback_to_any = true;
        self
    }

    pub fn select<'s, S: Skill>(&self, ctx: &BehaviourContext, skills: &'s [S]) -> Option<&'s S> {
        let health = ctx.health_percent();

        let mut matching: Vec<&HealthRange> =
            self.ranges.iter().filter(|r| r.contains(health)).collect();
        matching.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.min.total_cmp(&b.min))
        });

        let banded = matching
            .into_iter()
            .find_map(|range| first_ready_of(skills, &range.skills));

        match banded {
            Some(skill) => Some(skill),
            None if self.fallback_to_any => first_ready(skills),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors::test_support::{ctx, slots};
    use crate::skill::SkillSlot;
    use crate::types::{TeamId, UnitId, Vec3};

    #[test]
    fn distance_without_target_is_none() {
        let (_w, ctx) = ctx();
        let selector = DistanceBandedSelector::new(vec![DistanceRange::new(0.0, 100.0, &["Bite"])])
            .with_fallback();
        assert!(selector.select(&ctx, &slots(&["Bite"])).is_none());
    }

    #[test]
    fn overlapping_distance_bands_prefer_lowest_min() {
        let (world, mut ctx) = ctx();
        world.spawn(UnitId(2), TeamId(1), Vec3::new(4.0, 0.0, 0.0));
        ctx.set_current_target(Some(UnitId(2)));

        // Authored far-to-near on purpose.
        let selector = DistanceBandedSelector::new(vec![
            DistanceRange::new(3.0, 20.0, &["Arrow", "Spear"]),
            DistanceRange::new(0.0, 5.0, &["Slash", "Kick"]),
        ]);
        let skills = slots(&["Arrow", "Spear", "Slash", "Kick"]);
        assert_eq!(selector.select(&ctx, &skills).map(|s| s.name()), Some("Slash"));

        let skills = vec![
            SkillSlot::new("Arrow", 1.0),
            SkillSlot::new("Slash", 1.0).cooling_down(1.0),
            SkillSlot::new("Kick", 1.0),
        ];
        assert_eq!(selector.select(&ctx, &skills).map(|s| s.name()), Some("Kick"));

        let skills = vec![SkillSlot::new("Arrow", 1.0), SkillSlot::new("Slash", 1.0).cooling_down(1.0)];
        assert_eq!(selector.select(&ctx, &skills).map(|s| s.name()), Some("Arrow"));
    }

    #[test]
    fn distance_bounds_are_inclusive_and_fallback_is_optional() {
        let (world, mut ctx) = ctx();
        world.spawn(UnitId(2), TeamId(1), Vec3::new(0.0, 0.0, 5.0));
        ctx.set_current_target(Some(UnitId(2)));

        let selector = DistanceBandedSelector::new(vec![DistanceRange::new(0.0, 5.0, &["Slash"])]);
        assert_eq!(selector.select(&ctx, &slots(&["Slash"])).map(|s| s.name()), Some("Slash"));

        let far = DistanceBandedSelector::new(vec![DistanceRange::new(6.0, 10.0, &["Arrow"])]);
        let skills = slots(&["Bite", "Arrow"]);
        assert!(far.select(&ctx, &skills).is_none());
        assert_eq!(
            far.with_fallback().select(&ctx, &skills).map(|s| s.name()),
            Some("Bite")
        );
    }

    #[test]
    fn health_bands_prefer_higher_priority_regardless_of_order() {
        let (_w, mut ctx) = ctx();
        ctx.set_health_percent(0.2);
        let skills = slots(&["Heal", "Frenzy"]);

        let low_first = HealthBandedSelector::new(vec![
            HealthRange::new(0.0, 0.5, 1, &["Frenzy"]),
            HealthRange::new(0.0, 0.3, 5, &["Heal"]),
        ]);
        let high_first = HealthBandedSelector::new(vec![
            HealthRange::new(0.0, 0.3, 5, &["Heal"]),
            HealthRange::new(0.0, 0.5, 1, &["Frenzy"]),
        ]);

        assert_eq!(low_first.select(&ctx, &skills).map(|s| s.name()), Some("Heal"));
        assert_eq!(high_first.select(&ctx, &skills).map(|s| s.name()), Some("Heal"));
    }

    #[test]
    fn health_band_ties_break_on_min() {
        let (_w, mut ctx) = ctx();
        ctx.set_health_percent(0.5);
        let selector = HealthBandedSelector::new(vec![
            HealthRange::new(0.4, 1.0, 0, &["Guard"]),
            HealthRange::new(0.0, 0.6, 0, &["Parry"]),
        ]);
        let skills = slots(&["Guard", "Parry"]);
        assert_eq!(selector.select(&ctx, &skills).map(|s| s.name()), Some("Parry"));
    }

    #[test]
    fn health_outside_every_band() {
        let (_w, mut ctx) = ctx();
        ctx.set_health_percent(0.9);
        let selector = HealthBandedSelector::new(vec![HealthRange::new(0.0, 0.3, 0, &["Heal"])]);
        let skills = slots(&["Heal", "Bite"]);
        assert!(selector.select(&ctx, &skills).is_none());
        assert_eq!(
            selector.with_fallback().select(&ctx, &skills).map(|s| s.name()),
            Some("Heal")
        );
    }
}
