//! Identity handles and small numeric helpers shared by every module.

pub use glam::Vec3;

/// Opaque handle to an agent in the world.
///
/// The core never interprets the value; it is only compared, hashed and
/// handed back to the [`WorldQuery`](crate::WorldQuery) and
/// [`ThreatSource`](crate::ThreatSource) collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u64);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Team tag. Two units are enemies iff their teams differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamId(pub u32);

impl TeamId {
    /// Returns true if `other` belongs to an opposing team.
    #[inline]
    pub fn is_enemy_of(self, other: TeamId) -> bool {
        self != other
    }
}

/// Approximate float equality, tolerant to accumulated rounding.
///
/// Uses a relative tolerance for large magnitudes and a small absolute
/// tolerance around zero.
#[inline]
pub fn approximately(a: f32, b: f32) -> bool {
    let tolerance = (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0);
    (b - a).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approximately_absorbs_rounding() {
        assert!(approximately(0.1 + 0.2, 0.3));
        assert!(approximately(1_000_000.0, 1_000_000.5));
        assert!(!approximately(1.0, 1.001));
    }

    #[test]
    fn teams_are_enemies_only_when_different() {
        assert!(TeamId(1).is_enemy_of(TeamId(2)));
        assert!(!TeamId(3).is_enemy_of(TeamId(3)));
    }
}
