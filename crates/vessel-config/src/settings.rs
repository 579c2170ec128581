//! Server settings with multi-source loading.
//!
//! Priority: CLI overrides > environment (`VESSEL_*`) > config file > defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default config file looked up in the current directory.
pub const SETTINGS_FILE: &str = "vessel.toml";

/// How the host document references the bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// The document loads `./bundle.js`; the bundle text is delivered alongside.
    #[default]
    Separate,
    /// The bundle is embedded in an inline `<script type="module">`.
    Inlined,
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "separate" => Ok(Self::Separate),
            "inlined" | "inline" => Ok(Self::Inlined),
            other => Err(ConfigError::invalid(
                "output_mode",
                format!("'{}' (expected: separate, inlined)", other),
            )),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Separate => f.write_str("separate"),
            Self::Inlined => f.write_str("inlined"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,

    /// Parent directory of per-request workspaces.
    pub work_dir: PathBuf,

    /// Where debug builds persist `index.html` and `bundle.js`.
    pub output_dir: PathBuf,

    pub output_mode: OutputMode,
    pub debug: bool,
    pub minify: bool,

    /// Branch retried when the requested one cannot be cloned.
    pub default_branch: String,

    pub git_program: String,

    /// Program and arguments run inside the workspace to install dependencies.
    pub package_manager: Vec<String>,

    /// Name of the directory the package manager populates.
    pub dependency_dir: String,

    pub request_timeout_secs: u64,
    pub max_concurrent_bundles: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            work_dir: PathBuf::from(".tmp"),
            output_dir: PathBuf::from("dist"),
            output_mode: OutputMode::Separate,
            debug: false,
            minify: true,
            default_branch: "main".to_string(),
            git_program: "git".to_string(),
            package_manager: vec!["bun".to_string(), "install".to_string()],
            dependency_dir: "node_modules".to_string(),
            request_timeout_secs: 600,
            max_concurrent_bundles: 4,
        }
    }
}

impl ServerSettings {
    /// Layered figment without CLI overrides.
    ///
    /// An explicit `config_path` must exist; the default `vessel.toml` is
    /// only merged when present.
    pub fn figment(config_path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        match config_path {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let default_path = Path::new(SETTINGS_FILE);
                if default_path.is_file() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed("VESSEL_")))
    }

    /// Extract and validate settings from a prepared figment.
    pub fn extract(figment: Figment) -> Result<Self> {
        let settings: Self = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::extract(Self::figment(config_path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.package_manager.is_empty() || self.package_manager[0].trim().is_empty() {
            return Err(ConfigError::invalid(
                "package_manager",
                "must name a program, e.g. [\"bun\", \"install\"]",
            ));
        }
        if self.git_program.trim().is_empty() {
            return Err(ConfigError::invalid("git_program", "must not be empty"));
        }
        if self.default_branch.trim().is_empty() {
            return Err(ConfigError::invalid("default_branch", "must not be empty"));
        }
        if self.dependency_dir.trim().is_empty() || self.dependency_dir.contains('/') {
            return Err(ConfigError::invalid(
                "dependency_dir",
                "must be a single directory name",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs", "must be at least 1"));
        }
        if self.max_concurrent_bundles == 0 {
            return Err(ConfigError::invalid("max_concurrent_bundles", "must be at least 1"));
        }
        Ok(())
    }
}
