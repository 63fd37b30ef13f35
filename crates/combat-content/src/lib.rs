//! Data-driven combat AI content.
//!
//! This crate houses the authored behaviour profiles and the loaders that
//! turn RON files into shared [`Profile`](combat_ai::Profile)s:
//! - Single profile files ([`ProfileLoader`])
//! - Directories of profiles, keyed by profile name ([`ProfileRegistry`])
//! - The profiles shipped with this crate ([`ProfileRegistry::builtin`])
//!
//! Loading validates the graph once, logging profiles that cannot be built
//! and states no transition can reach. The runtime tick loop never checks
//! structure again.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{LoadResult, ProfileLoader, ProfileRegistry};
