//! Errors raised while building a profile.

use thiserror::Error;

/// Structural problems found when turning a [`ProfileDef`](crate::ProfileDef)
/// into a [`Profile`](crate::Profile).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile '{profile}' has no initial state")]
    MissingInitialState { profile: String },

    #[error("profile '{profile}' names initial state '{initial}', which does not exist")]
    UnknownInitialState { profile: String, initial: String },

    #[error("profile '{profile}' defines state '{state}' more than once")]
    DuplicateState { profile: String, state: String },

    #[error("transition from '{from}' targets unknown state '{target}'")]
    UnknownTransitionTarget { from: String, target: String },

    #[error("profile '{profile}' contains a state with an empty id")]
    EmptyStateId { profile: String },
}

pub type Result<T> = std::result::Result<T, ProfileError>;
