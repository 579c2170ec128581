//! A provisioned checkout the bundler works against.

use std::path::{Path, PathBuf};

use vessel_config::{DependencyMap, PackageManifest};

use crate::Result;

/// Default name of the directory the package manager materializes.
pub const DEFAULT_DEPENDENCY_DIR: &str = "node_modules";

/// Root of a checkout plus its installed dependency directory.
///
/// The bundler only reads from it. Creating and deleting the directory is
/// the job of whoever provisioned it.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    dependency_dir: PathBuf,
    manifest: PackageManifest,
}

impl Workspace {
    /// Open an existing checkout, reading its `package.json`.
    ///
    /// The root is canonicalized so that paths reported by the package
    /// resolver (which follows symlinks) compare equal to workspace paths.
    pub fn open(root: impl AsRef<Path>, dependency_dir: &str) -> Result<Self> {
        let root = std::fs::canonicalize(root.as_ref())?;
        let manifest = PackageManifest::load(&root)?;
        Ok(Self::new(root, manifest, dependency_dir))
    }

    pub fn new(root: impl Into<PathBuf>, manifest: PackageManifest, dependency_dir: &str) -> Self {
        let root = root.into();
        let dependency_dir = root.join(dependency_dir);
        Self {
            root,
            dependency_dir,
            manifest,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dependency_dir(&self) -> &Path {
        &self.dependency_dir
    }

    /// Directory name of the dependency directory (`node_modules`).
    pub fn dependency_dir_name(&self) -> &str {
        self.dependency_dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_DEPENDENCY_DIR)
    }

    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// Runtime dependencies declared by the checkout (peers win).
    pub fn dependencies(&self) -> DependencyMap {
        self.manifest.runtime_dependencies()
    }

    /// Whether `path` lives inside the workspace but outside any dependency
    /// directory.
    pub fn is_local_source(&self, path: &Path) -> bool {
        path.starts_with(&self.root) && !self.is_dependency(path)
    }

    /// Whether `path` lives inside a dependency directory of this workspace,
    /// including nested ones.
    pub fn is_dependency(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let name = self.dependency_dir_name();
        relative
            .components()
            .any(|component| component.as_os_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        Workspace::new("/w", PackageManifest::default(), DEFAULT_DEPENDENCY_DIR)
    }

    #[test]
    fn test_dependency_dir_is_under_root() {
        let ws = workspace();
        assert_eq!(ws.dependency_dir(), Path::new("/w/node_modules"));
        assert_eq!(ws.dependency_dir_name(), "node_modules");
    }

    #[test]
    fn test_local_and_dependency_paths() {
        let ws = workspace();
        assert!(ws.is_local_source(Path::new("/w/src/app.tsx")));
        assert!(!ws.is_local_source(Path::new("/w/node_modules/react/index.js")));
        assert!(ws.is_dependency(Path::new("/w/packages/ui/node_modules/x/index.js")));
        assert!(!ws.is_local_source(Path::new("/elsewhere/app.tsx")));
        assert!(!ws.is_dependency(Path::new("/elsewhere/node_modules/x.js")));
    }
}
