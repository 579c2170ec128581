//! Typed model of a workspace `package.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const MANIFEST_FILE: &str = "package.json";

/// Dependency name → version range.
pub type DependencyMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub dependencies: DependencyMap,

    #[serde(default)]
    pub peer_dependencies: DependencyMap,

    #[serde(default)]
    pub dev_dependencies: DependencyMap,
}

impl PackageManifest {
    pub fn parse(source: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(source).map_err(|source| ConfigError::InvalidJson {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read `package.json` from a workspace root.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(ConfigError::NotFound(path));
        }
        let source = fs::read_to_string(&path)?;
        Self::parse(&source, &path)
    }

    /// Dependencies the bundle may pull in at runtime: `dependencies` merged
    /// with `peerDependencies`, peer ranges winning on conflict.
    pub fn runtime_dependencies(&self) -> DependencyMap {
        let mut merged = self.dependencies.clone();
        merged.extend(
            self.peer_dependencies
                .iter()
                .map(|(name, range)| (name.clone(), range.clone())),
        );
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default_to_empty() {
        let manifest = PackageManifest::parse(r#"{ "name": "demo" }"#, Path::new("package.json"))
            .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("demo"));
        assert!(manifest.dependencies.is_empty());
        assert!(manifest.runtime_dependencies().is_empty());
    }

    #[test]
    fn runtime_dependencies_prefer_peer_ranges() {
        let manifest = PackageManifest::parse(
            r#"{
                "dependencies": { "react": "^18.2.0", "clsx": "^2.0.0" },
                "peerDependencies": { "react": ">=18" },
                "devDependencies": { "typescript": "^5" }
            }"#,
            Path::new("package.json"),
        )
        .unwrap();

        let deps = manifest.runtime_dependencies();
        assert_eq!(deps.get("react").map(String::as_str), Some(">=18"));
        assert_eq!(deps.get("clsx").map(String::as_str), Some("^2.0.0"));
        assert!(!deps.contains_key("typescript"));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let err = PackageManifest::parse(r#"{ "dependencies": ["react"] }"#, Path::new("p"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson { .. }));
    }
}
