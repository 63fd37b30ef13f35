//! World query seam.
//!
//! The core never enumerates units itself. Spatial lookups (nearest enemy,
//! enemies within a radius, "is my target still alive?") go through the
//! [`WorldQuery`] trait, which the host game implements on top of its own
//! physics or spatial index.
//!
//! [`InMemoryWorld`] is a small concrete implementation backed by a hash map.
//! It is what the arena harness and the tests run against.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::{TeamId, UnitId, Vec3};

/// Read-only view of a live unit at query time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub team: TeamId,
    pub position: Vec3,
    /// Health as a fraction of maximum, in `[0, 1]`.
    pub health_percent: f32,
}

/// Team filter applied to spatial queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeamFilter {
    /// Every live unit.
    Any,
    /// Only units on this team.
    Only(TeamId),
    /// Every unit not on this team (i.e. enemies of `TeamId`).
    Except(TeamId),
}

impl TeamFilter {
    #[inline]
    pub fn accepts(self, team: TeamId) -> bool {
        match self {
            TeamFilter::Any => true,
            TeamFilter::Only(t) => team == t,
            TeamFilter::Except(t) => team != t,
        }
    }
}

/// Spatial query primitive provided by the host.
///
/// Implementations must only ever return live units: a dead or despawned
/// unit is indistinguishable from one that never existed.
pub trait WorldQuery: Send + Sync {
    /// Looks up a single live unit.
    fn unit(&self, id: UnitId) -> Option<UnitSnapshot>;

    /// All live units accepted by `filter` whose distance to `center` is at
    /// most `radius`. Order is unspecified.
    fn units_within(&self, center: Vec3, radius: f32, filter: TeamFilter) -> Vec<UnitSnapshot>;

    /// The live unit accepted by `filter` closest to `center`.
    fn nearest(&self, center: Vec3, filter: TeamFilter) -> Option<UnitSnapshot> {
        self.units_within(center, f32::INFINITY, filter)
            .into_iter()
            .min_by(|a, b| {
                center
                    .distance_squared(a.position)
                    .total_cmp(&center.distance_squared(b.position))
            })
    }

    /// Returns true if `id` refers to a live unit.
    fn is_alive(&self, id: UnitId) -> bool {
        self.unit(id).is_some()
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct UnitRecord {
    snapshot: UnitSnapshot,
    alive: bool,
}

/// Hash-map backed [`WorldQuery`].
///
/// Uses interior mutability so the host can move units and apply damage
/// while runners hold `Arc<dyn WorldQuery>` handles to the same world.
#[derive(Default)]
pub struct InMemoryWorld {
    units: RwLock<HashMap<UnitId, UnitRecord>>,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns (or respawns) a unit at full health.
    pub fn spawn(&self, id: UnitId, team: TeamId, position: Vec3) {
        self.units.write().insert(
            id,
            UnitRecord {
                snapshot: UnitSnapshot {
                    id,
                    team,
                    position,
                    health_percent: 1.0,
                },
                alive: true,
            },
        );
    }

    /// Removes a unit entirely.
    pub fn despawn(&self, id: UnitId) -> bool {
        self.units.write().remove(&id).is_some()
    }

    /// Marks a unit dead. Dead units stay in the table but are invisible to
    /// every query.
    pub fn kill(&self, id: UnitId) {
        if let Some(record) = self.units.write().get_mut(&id) {
            record.alive = false;
            record.snapshot.health_percent = 0.0;
        }
    }

    pub fn set_position(&self, id: UnitId, position: Vec3) {
        if let Some(record) = self.units.write().get_mut(&id) {
            record.snapshot.position = position;
        }
    }

    pub fn set_health_percent(&self, id: UnitId, health_percent: f32) {
        if let Some(record) = self.units.write().get_mut(&id) {
            record.snapshot.health_percent = health_percent.clamp(0.0, 1.0);
        }
    }

    /// Subtracts `fraction` of max health. Returns true if this killed the
    /// unit.
    pub fn apply_damage(&self, id: UnitId, fraction: f32) -> bool {
        let mut units = self.units.write();
        let Some(record) = units.get_mut(&id) else {
            return false;
        };
        if !record.alive {
            return false;
        }
        record.snapshot.health_percent = (record.snapshot.health_percent - fraction).clamp(0.0, 1.0);
        if record.snapshot.health_percent <= 0.0 {
            record.alive = false;
            return true;
        }
        false
    }

    /// Number of live units on `team`.
    pub fn alive_count(&self, team: TeamId) -> usize {
        self.units
            .read()
            .values()
            .filter(|r| r.alive && r.snapshot.team == team)
            .count()
    }
}

impl WorldQuery for InMemoryWorld {
    fn unit(&self, id: UnitId) -> Option<UnitSnapshot> {
        self.units
            .read()
            .get(&id)
            .filter(|r| r.alive)
            .map(|r| r.snapshot)
    }

    fn units_within(&self, center: Vec3, radius: f32, filter: TeamFilter) -> Vec<UnitSnapshot> {
        self.units
            .read()
            .values()
            .filter(|r| r.alive && filter.accepts(r.snapshot.team))
            .filter(|r| center.distance(r.snapshot.position) <= radius)
            .map(|r| r.snapshot)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> InMemoryWorld {
        let world = InMemoryWorld::new();
        world.spawn(UnitId(1), TeamId(0), Vec3::ZERO);
        world.spawn(UnitId(2), TeamId(1), Vec3::new(3.0, 0.0, 0.0));
        world.spawn(UnitId(3), TeamId(1), Vec3::new(10.0, 0.0, 0.0));
        world.spawn(UnitId(4), TeamId(0), Vec3::new(1.0, 0.0, 0.0));
        world
    }

    #[test]
    fn units_within_filters_by_team_and_radius() {
        let world = world();
        let enemies = world.units_within(Vec3::ZERO, 5.0, TeamFilter::Except(TeamId(0)));
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].id, UnitId(2));
    }

    #[test]
    fn nearest_skips_dead_units() {
        let world = world();
        world.kill(UnitId(2));
        let nearest = world.nearest(Vec3::ZERO, TeamFilter::Except(TeamId(0)));
        assert_eq!(nearest.map(|u| u.id), Some(UnitId(3)));
        assert!(!world.is_alive(UnitId(2)));
    }

    #[test]
    fn lethal_damage_kills_once() {
        let world = world();
        assert!(!world.apply_damage(UnitId(3), 0.6));
        assert!(world.apply_damage(UnitId(3), 0.6));
        assert!(!world.apply_damage(UnitId(3), 0.6));
        assert_eq!(world.alive_count(TeamId(1)), 1);
    }
}
