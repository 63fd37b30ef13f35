//! Fixed-order selection.

use crate::skill::Skill;

use super::ready_named;

/// One `(skill, priority)` pair. Lower numbers are tried first.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityEntry {
    pub skill: String,
    pub priority: i32,
}

impl PriorityEntry {
    pub fn new(skill: impl Into<String>, priority: i32) -> Self {
        Self {
            skill: skill.into(),
            priority,
        }
    }
}

/// Tries listed skills by ascending priority number; ties keep authored
/// order. Candidates not listed are never chosen.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrioritySelector {
    pub entries: Vec<PriorityEntry>,
}

impl PrioritySelector {
    pub fn new(entries: Vec<PriorityEntry>) -> Self {
        Self { entries }
    }

    pub fn select<'s, S: Skill>(&self, skills: &'s [S]) -> Option<&'s S> {
        let mut order: Vec<&PriorityEntry> = self.entries.iter().collect();
        order.sort_by_key(|e| e.priority);

        order
            .into_iter()
            .find_map(|entry| ready_named(skills, &entry.skill))
    }
}
