//! Named collection of loaded profiles.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use combat_ai::Profile;

use crate::loaders::{LoadResult, ProfileLoader};

/// Profiles embedded in the crate, as `(file name, RON source)`.
const BUILTIN: &[(&str, &str)] = &[
    ("guardian.ron", include_str!("../../data/profiles/guardian.ron")),
    ("skirmisher.ron", include_str!("../../data/profiles/skirmisher.ron")),
];

/// Registry of shared profiles, keyed by profile name.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Arc<Profile>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the profiles shipped with this crate.
    pub fn builtin() -> LoadResult<Self> {
        let mut registry = Self::new();
        for (file, source) in BUILTIN {
            let profile = ProfileLoader::load_str(source)
                .map_err(|e| anyhow::anyhow!("Failed to load builtin {}: {}", file, e))?;
            registry.insert(profile)?;
        }
        Ok(registry)
    }

    /// Loads every `*.ron` file in `dir`.
    ///
    /// Expected directory structure:
    /// ```text
    /// profiles/
    ///   ├── guardian.ron
    ///   └── skirmisher.ron
    /// ```
    ///
    /// Files are read in name order. Any file that fails to parse or build
    /// fails the whole load, as do two files declaring the same profile name.
    pub fn load_dir(dir: &Path) -> LoadResult<Self> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| anyhow::anyhow!("Failed to list {}: {}", dir.display(), e))?
                .path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::new();
        for path in &paths {
            registry.insert(ProfileLoader::load(path)?)?;
        }

        if registry.is_empty() {
            tracing::warn!("No profiles found in {}", dir.display());
        }
        Ok(registry)
    }

    /// Adds a profile. Fails if the name is already taken.
    pub fn insert(&mut self, profile: Arc<Profile>) -> LoadResult<()> {
        let name = profile.name().to_owned();
        if self.profiles.contains_key(&name) {
            anyhow::bail!("Duplicate profile name '{}'", name);
        }
        self.profiles.insert(name, profile);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Profile>> {
        self.profiles.get(name).cloned()
    }

    /// Returns profile names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
