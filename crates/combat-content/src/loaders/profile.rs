//! Behaviour profile loader.

use std::path::Path;
use std::sync::Arc;

use combat_ai::{Profile, ProfileDef};

use crate::loaders::{LoadResult, read_file};

/// Loader for a single behaviour profile from RON.
///
/// A profile file holds one [`ProfileDef`]:
///
/// ```ron
/// #![enable(implicit_some)]
/// (
///     name: "grunt",
///     initial: "Fight",
///     states: [
///         (
///             id: "Fight",
///             selector: FirstAvailable,
///             transitions: [
///                 (target: "Flee", conditions: [Health((threshold: LessThan(0.5)))]),
///             ],
///         ),
///         (id: "Flee"),
///     ],
/// )
/// ```
pub struct ProfileLoader;

impl ProfileLoader {
    /// Load and build a profile from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a ProfileDef
    ///
    /// # Returns
    ///
    /// The validated profile, ready to share between runners.
    pub fn load(path: &Path) -> LoadResult<Arc<Profile>> {
        let content = read_file(path)?;
        Self::load_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load profile {}: {}", path.display(), e))
    }

    /// Build a profile from RON source text.
    pub fn load_str(source: &str) -> LoadResult<Arc<Profile>> {
        let def = Self::parse(source)?;
        Self::build(def).map(Arc::new)
    }

    /// Parse RON source without building the graph.
    pub fn parse(source: &str) -> LoadResult<ProfileDef> {
        ron::from_str(source).map_err(|e| anyhow::anyhow!("Failed to parse profile RON: {}", e))
    }

    /// Build a parsed definition, logging structural problems.
    ///
    /// Build errors are logged and returned. Unreachable states are only
    /// logged: such a profile still works, it just carries dead weight.
    pub fn build(def: ProfileDef) -> LoadResult<Profile> {
        let name = def.name.clone();

        let profile = def.build().map_err(|e| {
            tracing::error!("Profile '{}' rejected: {}", name, e);
            anyhow::Error::new(e)
        })?;

        for state in profile.unreachable_states() {
            tracing::warn!(
                "Profile '{}': state '{}' is unreachable from initial state '{}'",
                name,
                state,
                profile.state_name(profile.initial())
            );
        }

        tracing::info!("Loaded profile '{}' ({} states)", name, profile.states().len());
        Ok(profile)
    }
}
