//! Resource bundles.
//!
//! A bundle is a directory `<root>/<name>`. Once initialized, its contents
//! are reachable through logical `:/...` paths; lookups walk the bundles in
//! initialization order. Paths without the `:/` prefix are plain filesystem
//! paths and pass through untouched.

use std::path::{Path, PathBuf};

use crate::font::FontError;

pub const RESOURCE_PREFIX: &str = ":/";

#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    root: PathBuf,
    bundles: Vec<(String, PathBuf)>,
}

impl ResourceRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            bundles: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Makes bundle `name` available for lookups. Initializing twice is a
    /// no-op.
    pub fn init_bundle(&mut self, name: &str) -> Result<(), FontError> {
        if self.is_initialized(name) {
            return Ok(());
        }

        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(FontError::MissingBundle {
                name: name.to_string(),
                path: dir.display().to_string(),
            });
        }

        log::debug!("Font: resource bundle '{}' at {}", name, dir.display());
        self.bundles.push((name.to_string(), dir));
        Ok(())
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.bundles.iter().any(|(n, _)| n == name)
    }

    pub fn bundles(&self) -> impl Iterator<Item = &str> {
        self.bundles.iter().map(|(name, _)| name.as_str())
    }

    /// Maps a logical path to a file on disk.
    pub fn resolve(&self, logical: &str) -> Result<PathBuf, FontError> {
        let Some(relative) = logical.strip_prefix(RESOURCE_PREFIX) else {
            return Ok(PathBuf::from(logical));
        };

        self.bundles
            .iter()
            .map(|(_, dir)| dir.join(relative))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| FontError::MissingResource(logical.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn resolves_through_initialized_bundles_in_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("fonts/gui/fonts/A.ttf"));
        touch(&dir.path().join("linux/gui/fonts/A.ttf"));
        touch(&dir.path().join("linux/gui/fonts/B.ttf"));

        let mut resources = ResourceRegistry::new(dir.path());
        assert!(matches!(
            resources.resolve(":/gui/fonts/A.ttf"),
            Err(FontError::MissingResource(_))
        ));

        resources.init_bundle("fonts").unwrap();
        resources.init_bundle("linux").unwrap();

        assert_eq!(
            resources.resolve(":/gui/fonts/A.ttf").unwrap(),
            dir.path().join("fonts/gui/fonts/A.ttf")
        );
        assert_eq!(
            resources.resolve(":/gui/fonts/B.ttf").unwrap(),
            dir.path().join("linux/gui/fonts/B.ttf")
        );
    }

    #[test]
    fn missing_bundle_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut resources = ResourceRegistry::new(dir.path());

        let err = resources.init_bundle("mac").unwrap_err();
        assert!(matches!(err, FontError::MissingBundle { ref name, .. } if name == "mac"));
        assert_eq!(resources.bundles().count(), 0);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("fonts")).unwrap();

        let mut resources = ResourceRegistry::new(dir.path());
        resources.init_bundle("fonts").unwrap();
        resources.init_bundle("fonts").unwrap();
        assert_eq!(resources.bundles().collect::<Vec<_>>(), ["fonts"]);
    }

    #[test]
    fn plain_paths_pass_through() {
        let resources = ResourceRegistry::new("unused");
        assert_eq!(
            resources.resolve("/usr/share/fonts/X.ttf").unwrap(),
            PathBuf::from("/usr/share/fonts/X.ttf")
        );
    }
}
