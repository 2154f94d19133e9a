//! Artifact manifest - the outputs a stage commits to producing

use std::path::{Path, PathBuf};

/// Ordered mapping from symbolic output name to filesystem path.
///
/// Fixed at stage construction time; `run` only populates the files at
/// these paths. Downstream stages consume the paths by name when the
/// pipeline is built.
#[derive(Debug, Clone, Default)]
pub struct ArtifactManifest {
    entries: Vec<(String, PathBuf)>,
}

impl ArtifactManifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declare an output under a symbolic name
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.push((name.into(), path.into()));
    }

    /// Declare an output and return the manifest (for chained construction)
    pub fn with(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(name, path);
        self
    }

    /// Look up a declared output path by name
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_path())
    }

    /// Iterate over declared outputs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every declared output exists on disk.
    ///
    /// A pure function of the declared paths; an empty manifest is
    /// vacuously complete.
    pub fn all_present(&self) -> bool {
        self.entries.iter().all(|(_, p)| p.exists())
    }

    /// Paths of declared outputs that do not exist on disk
    pub fn missing(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|(_, p)| !p.exists())
            .map(|(_, p)| p.clone())
            .collect()
    }
}
