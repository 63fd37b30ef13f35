//! Authoring-side definitions of a profile.
//!
//! These mirror the runtime graph but refer to states by name and tolerate
//! holes (`None` conditions) the way hand-edited data does. The same types
//! back both code-built profiles and RON files.
//!
//! # Example
//!
//! ```rust
//! use combat_ai::conditions::{Condition, HealthCondition, Threshold};
//! use combat_ai::{ProfileDef, StateDef, TransitionDef};
//!
//! let profile = ProfileDef::new("grunt")
//!     .initial("Fight")
//!     .state(StateDef::new("Fight").transition(
//!         TransitionDef::to("Flee")
//!             .when(Condition::Health(HealthCondition::new(Threshold::LessThan(0.5)))),
//!     ))
//!     .state(StateDef::new("Flee"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(profile.states().len(), 2);
//! ```

use std::collections::HashMap;

use crate::conditions::Condition;
use crate::error::{ProfileError, Result};
use crate::selectors::SkillSelector;
use crate::triggers::SkillTrigger;

use super::{Profile, State, StateId, Transition};

/// Label used for the source of global transitions in errors and logs.
const GLOBAL: &str = "<global>";

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionDef {
    pub target: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<Option<Condition>>,
}

impl TransitionDef {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a condition (builder pattern).
    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(Some(condition));
        self
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDef {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub selector: Option<SkillSelector>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub transitions: Vec<TransitionDef>,
}

impl StateDef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn selector(mut self, selector: SkillSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    #[must_use]
    pub fn transition(mut self, transition: TransitionDef) -> Self {
        self.transitions.push(transition);
        self
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial: Option<String>,
    pub states: Vec<StateDef>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub global_transitions: Vec<TransitionDef>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub triggers: Vec<SkillTrigger>,
}

impl ProfileDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: StateDef) -> Self {
        self.states.push(state);
        self
    }

    #[must_use]
    pub fn global(mut self, transition: TransitionDef) -> Self {
        self.global_transitions.push(transition);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: SkillTrigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Validates the definition and produces the runtime graph.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] for an empty or duplicate state id, a
    /// missing or unknown initial state, or a transition whose target does
    /// not name a state.
    pub fn build(self) -> Result<Profile> {
        let ProfileDef {
            name,
            initial,
            states,
            global_transitions,
            triggers,
        } = self;

        let mut index = HashMap::with_capacity(states.len());
        for (i, state) in states.iter().enumerate() {
            if state.id.is_empty() {
                return Err(ProfileError::EmptyStateId { profile: name });
            }
            if index.insert(state.id.clone(), StateId(i)).is_some() {
                return Err(ProfileError::DuplicateState {
                    profile: name,
                    state: state.id.clone(),
                });
            }
        }

        let initial_name = initial.ok_or_else(|| ProfileError::MissingInitialState {
            profile: name.clone(),
        })?;
        let initial = *index
            .get(&initial_name)
            .ok_or_else(|| ProfileError::UnknownInitialState {
                profile: name.clone(),
                initial: initial_name.clone(),
            })?;

        let global_transitions = resolve_transitions(&name, GLOBAL, global_transitions, &index)?;

        let states = states
            .into_iter()
            .enumerate()
            .map(|(i, def)| {
                let transitions = resolve_transitions(&name, &def.id, def.transitions, &index)?;
                Ok(State {
                    id: StateId(i),
                    name: def.id,
                    selector: def.selector,
                    transitions,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Built profile '{}' ({} states, {} global transitions, {} triggers)",
            name,
            states.len(),
            global_transitions.len(),
            triggers.len()
        );

        Ok(Profile {
            name,
            initial,
            states,
            index,
            global_transitions,
            triggers,
        })
    }
}

/// Resolves target names and sorts by ascending priority (stable).
fn resolve_transitions(
    profile: &str,
    from: &str,
    defs: Vec<TransitionDef>,
    index: &HashMap<String, StateId>,
) -> Result<Vec<Transition>> {
    let mut transitions = defs
        .into_iter()
        .map(|def| {
            let target = *index.get(&def.target).ok_or_else(|| {
                ProfileError::UnknownTransitionTarget {
                    from: from.to_owned(),
                    target: def.target.clone(),
                }
            })?;

            let declared = def.conditions.len();
            let conditions: Vec<Condition> = def.conditions.into_iter().flatten().collect();
            if conditions.len() != declared {
                tracing::warn!(
                    "Profile '{}': transition {} -> {} skips {} empty condition slot(s)",
                    profile,
                    from,
                    def.target,
                    declared - conditions.len()
                );
            }

            Ok(Transition {
                target,
                priority: def.priority,
                conditions,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    transitions.sort_by_key(|t| t.priority);
    Ok(transitions)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::BehaviourContext;
    use crate::types::{TeamId, UnitId, Vec3};
    use crate::world::InMemoryWorld;

    fn ctx() -> BehaviourContext {
        let world = Arc::new(InMemoryWorld::new());
        BehaviourContext::new(UnitId(1), TeamId(0), Vec3::ZERO, world)
    }

    fn two_state() -> ProfileDef {
        ProfileDef::new("test")
            .initial("A")
            .state(StateDef::new("A").transition(TransitionDef::to("B")))
            .state(StateDef::new("B"))
    }

    #[test]
    fn build_resolves_names() {
        let profile = two_state().build().unwrap();
        assert_eq!(profile.name(), "test");
        assert_eq!(profile.state_name(profile.initial()), "A");
        let b = profile.state_id("B").unwrap();
        let a = profile.state(profile.initial()).unwrap();
        assert_eq!(a.transitions()[0].target(), b);
    }

    #[test]
    fn build_rejects_structural_errors() {
        let missing = ProfileDef::new("p").state(StateDef::new("A")).build();
        assert!(matches!(missing, Err(ProfileError::MissingInitialState { .. })));

        let unknown_initial = ProfileDef::new("p").initial("Z").state(StateDef::new("A")).build();
        assert!(matches!(unknown_initial, Err(ProfileError::UnknownInitialState { .. })));

        let duplicate = ProfileDef::new("p")
            .initial("A")
            .state(StateDef::new("A"))
            .state(StateDef::new("A"))
            .build();
        assert!(matches!(duplicate, Err(ProfileError::DuplicateState { .. })));

        let empty = ProfileDef::new("p").initial("A").state(StateDef::new("")).build();
        assert!(matches!(empty, Err(ProfileError::EmptyStateId { .. })));
    }

    #[test]
    fn build_rejects_unknown_transition_target() {
        let err = ProfileDef::new("p")
            .initial("A")
            .state(StateDef::new("A").transition(TransitionDef::to("Nowhere")))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ProfileError::UnknownTransitionTarget {
                from: "A".into(),
                target: "Nowhere".into(),
            }
        );

        let global = ProfileDef::new("p")
            .initial("A")
            .state(StateDef::new("A"))
            .global(TransitionDef::to("Nowhere"))
            .build()
            .unwrap_err();
        assert!(matches!(global, ProfileError::UnknownTransitionTarget { from, .. } if from == GLOBAL));
    }

    #[test]
    fn transitions_are_sorted_by_priority_stably() {
        let profile = ProfileDef::new("p")
            .initial("A")
            .state(
                StateDef::new("A")
                    .transition(TransitionDef::to("C").priority(5))
                    .transition(TransitionDef::to("B").priority(1))
                    .transition(TransitionDef::to("C").priority(1)),
            )
            .state(StateDef::new("B"))
            .state(StateDef::new("C"))
            .build()
            .unwrap();

        let a = profile.state(profile.initial()).unwrap();
        let order: Vec<(&str, i32)> = a
            .transitions()
            .iter()
            .map(|t| (profile.state_name(t.target()), t.priority()))
            .collect();
        assert_eq!(order, vec![("B", 1), ("C", 1), ("C", 5)]);
    }

    #[test]
    fn empty_condition_slots_are_skipped() {
        let def = TransitionDef {
            target: "B".into(),
            priority: 0,
            conditions: vec![None, Some(Condition::Never), None],
        };
        let profile = ProfileDef::new("p")
            .initial("A")
            .state(StateDef::new("A").transition(def))
            .state(StateDef::new("B"))
            .build()
            .unwrap();
        let a = profile.state(profile.initial()).unwrap();
        assert_eq!(a.transitions()[0].conditions().len(), 1);
    }

    #[test]
    fn resolve_prefers_global_transitions() {
        let profile = ProfileDef::new("p")
            .initial("A")
            .state(StateDef::new("A").transition(TransitionDef::to("B").when(Condition::Always)))
            .state(StateDef::new("B"))
            .state(StateDef::new("G"))
            .global(TransitionDef::to("G").when(Condition::Always))
            .build()
            .unwrap();

        let mut ctx = ctx();
        let resolved = profile.resolve(&mut ctx, profile.initial()).unwrap();
        assert!(resolved.global);
        assert_eq!(profile.state_name(resolved.transition.target()), "G");
    }

    #[test]
    fn resolve_skips_unsatisfied_and_reports_none() {
        let profile = ProfileDef::new("p")
            .initial("A")
            .state(
                StateDef::new("A")
                    .transition(TransitionDef::to("B").when(Condition::Never))
                    .transition(TransitionDef::to("C").priority(3)),
            )
            .state(StateDef::new("B"))
            .state(StateDef::new("C"))
            .build()
            .unwrap();

        let mut ctx = ctx();
        let resolved = profile.resolve(&mut ctx, profile.initial()).unwrap();
        assert!(!resolved.global);
        assert_eq!(profile.state_name(resolved.transition.target()), "C");

        let c = profile.state_id("C").unwrap();
        assert!(profile.resolve(&mut ctx, c).is_none());
    }

    #[test]
    fn unreachable_states_are_reported() {
        let profile = ProfileDef::new("p")
            .initial("A")
            .state(StateDef::new("A").transition(TransitionDef::to("B")))
            .state(StateDef::new("B"))
            .state(StateDef::new("Orphan"))
            .state(StateDef::new("Reset"))
            .global(TransitionDef::to("Reset"))
            .build()
            .unwrap();

        assert_eq!(profile.unreachable_states(), vec!["Orphan"]);
        assert!(two_state().build().unwrap().unreachable_states().is_empty());
    }
}
