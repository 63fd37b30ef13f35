use std::collections::{HashMap, VecDeque};

use crate::context::BehaviourContext;
use crate::triggers::SkillTrigger;

use super::{State, Transition};

/// Dense index of a state inside its [`Profile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// A transition chosen by [`Profile::resolve`].
#[derive(Clone, Copy, Debug)]
pub struct ResolvedTransition<'p> {
    pub transition: &'p Transition,
    /// True if it came from the global set.
    pub global: bool,
}

/// Immutable behaviour graph shared by every agent that uses it.
#[derive(Clone, Debug)]
pub struct Profile {
    pub(crate) name: String,
    pub(crate) initial: StateId,
    pub(crate) states: Vec<State>,
    pub(crate) index: HashMap<String, StateId>,
    pub(crate) global_transitions: Vec<Transition>,
    pub(crate) triggers: Vec<SkillTrigger>,
}

impl Profile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    pub fn state_name(&self, id: StateId) -> &str {
        self.state(id).map_or("<unknown>", State::name)
    }

    /// Global transitions, ascending priority.
    pub fn global_transitions(&self) -> &[Transition] {
        &self.global_transitions
    }

    pub fn triggers(&self) -> &[SkillTrigger] {
        &self.triggers
    }

    /// Finds the transition that fires from `current` this tick.
    ///
    /// Global transitions are checked first and pre-empt local ones, so a
    /// global edge wins over a local edge of equal priority. Within each
    /// set the first satisfied transition in ascending priority wins.
    ///
    /// # Returns
    ///
    /// The winning transition, or `None` if the agent stays put.
    pub fn resolve<'p>(
        &'p self,
        ctx: &mut BehaviourContext,
        current: StateId,
    ) -> Option<ResolvedTransition<'p>> {
        if let Some(transition) = self.global_transitions.iter().find(|t| t.is_satisfied(ctx)) {
            return Some(ResolvedTransition {
                transition,
                global: true,
            });
        }

        self.state(current)?
            .transitions
            .iter()
            .find(|t| t.is_satisfied(ctx))
            .map(|transition| ResolvedTransition {
                transition,
                global: false,
            })
    }

    /// States no path of transitions reaches from the initial state.
    ///
    /// Global transitions are edges from every state, so their targets are
    /// always reachable.
    pub fn unreachable_states(&self) -> Vec<&str> {
        let mut seen = vec![false; self.states.len()];
        let mut queue = VecDeque::new();

        let mut visit = |id: StateId, queue: &mut VecDeque<StateId>| {
            if let Some(flag) = seen.get_mut(id.0) {
                if !*flag {
                    *flag = true;
                    queue.push_back(id);
                }
            }
        };

        visit(self.initial, &mut queue);
        for t in &self.global_transitions {
            visit(t.target, &mut queue);
        }

        while let Some(id) = queue.pop_front() {
            if let Some(state) = self.state(id) {
                for t in &state.transitions {
                    visit(t.target, &mut queue);
                }
            }
        }

        self.states
            .iter()
            .zip(&seen)
            .filter(|(_, reached)| !**reached)
            .map(|(state, _)| state.name.as_str())
            .collect()
    }
}
