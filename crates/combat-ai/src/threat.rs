//! Threat tables.
//!
//! Threat is accumulated aggro per potential target, maintained by the
//! damage/heal feed outside of the decision core. Conditions only read it
//! through [`ThreatSource`]; [`ThreatManager`] is the per-agent table the
//! arena harness writes into.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::UnitId;
use crate::world::WorldQuery;

/// Entries whose threat decays below this value are forgotten.
const THREAT_FLOOR: f32 = 0.01;

/// Read side of a per-agent threat table.
pub trait ThreatSource: Send + Sync {
    /// Threat held by `target`, or 0 if it is not tracked.
    fn threat(&self, target: UnitId) -> f32;

    /// Target with the highest threat, if any.
    fn highest_threat_target(&self) -> Option<UnitId>;

    /// Number of tracked targets.
    fn target_count(&self) -> usize;

    /// Every tracked target, highest threat first.
    fn threat_list(&self) -> Vec<(UnitId, f32)>;
}

/// Concrete threat table for one agent.
///
/// Ties on threat value are broken by insertion order: whoever generated
/// threat first keeps aggro.
#[derive(Debug, Default)]
pub struct ThreatManager {
    inner: RwLock<ThreatTable>,
}

#[derive(Debug, Default)]
struct ThreatTable {
    entries: HashMap<UnitId, ThreatEntry>,
    next_seq: u64,
}

#[derive(Clone, Copy, Debug)]
struct ThreatEntry {
    value: f32,
    seq: u64,
}

impl ThreatManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds threat for `target`. Non-positive amounts are ignored.
    pub fn add_threat(&self, target: UnitId, amount: f32) {
        if amount.is_nan() || amount <= 0.0 {
            return;
        }
        let mut guard = self.inner.write();
        let table = &mut *guard;
        let next_seq = &mut table.next_seq;
        table
            .entries
            .entry(target)
            .or_insert_with(|| {
                let seq = *next_seq;
                *next_seq += 1;
                ThreatEntry { value: 0.0, seq }
            })
            .value += amount;
    }

    /// Lowers threat for `target`, forgetting it once it reaches zero.
    pub fn reduce_threat(&self, target: UnitId, amount: f32) {
        let mut table = self.inner.write();
        let emptied = match table.entries.get_mut(&target) {
            Some(entry) => {
                entry.value = (entry.value - amount.max(0.0)).max(0.0);
                entry.value <= 0.0
            }
            None => false,
        };
        if emptied {
            table.entries.remove(&target);
        }
    }

    pub fn remove_target(&self, target: UnitId) -> bool {
        self.inner.write().entries.remove(&target).is_some()
    }

    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    /// Fades every entry by `rate_per_second` (fraction lost per second).
    pub fn decay(&self, dt: f32, rate_per_second: f32) {
        let keep = (1.0 - rate_per_second.clamp(0.0, 1.0)).powf(dt.max(0.0));
        let mut table = self.inner.write();
        table.entries.retain(|_, entry| {
            entry.value *= keep;
            entry.value >= THREAT_FLOOR
        });
    }

    /// Forgets every target the world no longer reports as alive.
    /// Returns the number of entries removed.
    pub fn prune_dead(&self, world: &dyn WorldQuery) -> usize {
        let mut table = self.inner.write();
        let before = table.entries.len();
        table.entries.retain(|id, _| world.is_alive(*id));
        before - table.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    fn sorted(&self) -> Vec<(UnitId, ThreatEntry)> {
        let table = self.inner.read();
        let mut list: Vec<_> = table.entries.iter().map(|(id, e)| (*id, *e)).collect();
        list.sort_by(|a, b| b.1.value.total_cmp(&a.1.value).then(a.1.seq.cmp(&b.1.seq)));
        list
    }
}

impl ThreatSource for ThreatManager {
    fn threat(&self, target: UnitId) -> f32 {
        self.inner
            .read()
            .entries
            .get(&target)
            .map(|e| e.value)
            .unwrap_or(0.0)
    }

    fn highest_threat_target(&self) -> Option<UnitId> {
        self.sorted().first().map(|(id, _)| *id)
    }

    fn target_count(&self) -> usize {
        self.inner.read().entries.len()
    }

    fn threat_list(&self) -> Vec<(UnitId, f32)> {
        self.sorted().into_iter().map(|(id, e)| (id, e.value)).collect()
    }
}
