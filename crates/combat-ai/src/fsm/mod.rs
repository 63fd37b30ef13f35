//! The state graph: transitions, states and the shared profile.
//!
//! A [`Profile`] is built once from a [`ProfileDef`], either in code through
//! the definition builders or from authored data, and is then immutable.
//! Any number of [`BehaviourRunner`](crate::BehaviourRunner)s can share one
//! profile behind an `Arc`.
//!
//! Building resolves state names to dense [`StateId`]s, rejects dangling
//! transition targets, and sorts every transition list by ascending
//! priority so the tick loop can walk them in order.

mod def;
mod profile;
mod state;
mod transition;

pub use def::{ProfileDef, StateDef, TransitionDef};
pub use profile::{Profile, ResolvedTransition, StateId};
pub use state::State;
pub use transition::Transition;
