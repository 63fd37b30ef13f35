use crate::selectors::SkillSelector;

use super::{StateId, Transition};

/// One node of the behaviour graph.
///
/// A state without a selector emits no skills; a state without transitions
/// only leaves through global transitions.
#[derive(Clone, Debug)]
pub struct State {
    pub(crate) id: StateId,
    pub(crate) name: String,
    pub(crate) selector: Option<SkillSelector>,
    pub(crate) transitions: Vec<Transition>,
}

impl State {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selector(&self) -> Option<&SkillSelector> {
        self.selector.as_ref()
    }

    /// Local transitions, ascending priority.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}
