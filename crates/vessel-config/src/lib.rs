//! Configuration models for vessel.
//!
//! - [`TsConfig`] and [`AliasTable`]: path aliasing read from a workspace's
//!   `tsconfig.json`
//! - [`PackageManifest`]: the workspace `package.json`
//! - [`ServerSettings`]: layered server configuration (defaults, `vessel.toml`,
//!   `VESSEL_*` environment)

pub mod alias;
pub mod error;
pub mod manifest;
pub mod settings;
pub mod tsconfig;

pub use alias::{AliasEntry, AliasTable};
pub use error::{ConfigError, Result};
pub use manifest::{DependencyMap, MANIFEST_FILE, PackageManifest};
pub use settings::{OutputMode, SETTINGS_FILE, ServerSettings};
pub use tsconfig::{CompilerOptions, TSCONFIG_FILE, TsConfig};
