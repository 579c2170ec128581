//! Module resolution for workspace imports.
//!
//! Every import encountered while walking the graph goes through
//! [`ModuleResolver::resolve`], which tries, in order:
//!
//! 1. **Alias**: the longest matching tsconfig `paths` prefix is substituted
//!    and the result tried with `.ts`, `.tsx`, `.js`, `.jsx`, then
//!    `index.{ts,tsx,js,jsx}` inside it as a directory. A substituted path
//!    that already names a file with an extension is taken as is.
//! 2. **Relative**: `./` and `../` specifiers are joined onto the importer's
//!    directory. No extension lookup here; the bundler's own extension list applies.
//! 3. **Package**: anything else is looked up in the dependency directory
//!    with browser package semantics. Failing here is fatal, except for
//!    modules a package's `browser` field maps to `false`: those resolve to
//!    [`Namespace::Ignored`] and load as an empty module.
//!
//! Resolution only reads the filesystem, so the same workspace snapshot,
//! alias table and specifier always produce the same [`ResolvedModule`].

use std::fmt;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use vessel_config::AliasTable;
use vessel_plugin_css::{StylesheetKind, classify};

use crate::workspace::Workspace;

/// Suffixes tried after alias substitution, in order.
pub const ALIAS_EXTENSIONS: [&str; 4] = [".ts", ".tsx", ".js", ".jsx"];

/// Extensions the package resolver tries for extensionless paths.
pub const PACKAGE_EXTENSIONS: [&str; 7] = [".tsx", ".ts", ".jsx", ".js", ".mjs", ".cjs", ".json"];

/// `package.json` fields consulted for a package entry point.
pub const MAIN_FIELDS: [&str; 3] = ["browser", "module", "main"];

/// Export conditions for a browser build.
pub const CONDITION_NAMES: [&str; 4] = ["browser", "import", "module", "default"];

/// One import to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSpecifier {
    pub text: String,
    /// Absolute path of the importing module.
    pub importer: PathBuf,
}

impl ImportSpecifier {
    pub fn new(text: impl Into<String>, importer: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            importer: importer.into(),
        }
    }

    pub fn is_relative(&self) -> bool {
        let text = self.text.as_str();
        text == "." || text == ".." || text.starts_with("./") || text.starts_with("../")
    }

    pub fn importer_dir(&self) -> &Path {
        self.importer.parent().unwrap_or(&self.importer)
    }
}

/// Decides which load hook handles a module.
///
/// Only [`Namespace::CssModule`] gets its class names rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Script inside the workspace, outside the dependency directory.
    Local,
    /// Stylesheet injected as-is after font stripping.
    CssGlobal,
    /// `*.module.css` / `*.module.scss` with scoped class names.
    CssModule,
    /// Script inside the dependency directory.
    External,
    /// Disabled by a `browser` field mapping; loads as an empty module.
    Ignored,
}

impl Namespace {
    pub fn rewrites_class_names(self) -> bool {
        matches!(self, Namespace::CssModule)
    }
}

/// How a specifier was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStep {
    Alias,
    Relative,
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub path: PathBuf,
    pub namespace: Namespace,
    pub step: ResolutionStep,
}

/// A specifier none of the resolution steps could map to a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Could not resolve '{specifier}' imported from {}: {reason}", .importer.display())]
pub struct ResolutionError {
    pub specifier: String,
    pub importer: PathBuf,
    pub reason: String,
}

pub struct ModuleResolver {
    workspace: Workspace,
    aliases: AliasTable,
    packages: oxc_resolver::Resolver,
}

impl fmt::Debug for ModuleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleResolver")
            .field("root", &self.workspace.root())
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl ModuleResolver {
    pub fn new(workspace: &Workspace, aliases: AliasTable) -> Self {
        let packages = oxc_resolver::Resolver::new(oxc_resolver::ResolveOptions {
            condition_names: CONDITION_NAMES.iter().map(|c| (*c).into()).collect(),
            main_fields: MAIN_FIELDS.iter().map(|f| (*f).into()).collect(),
            extensions: PACKAGE_EXTENSIONS.iter().map(|e| (*e).into()).collect(),
            modules: vec![workspace.dependency_dir_name().to_string()],
            alias_fields: vec![vec!["browser".into()]],
            ..Default::default()
        });

        Self {
            workspace: workspace.clone(),
            aliases,
            packages,
        }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn resolve(&self, spec: &ImportSpecifier) -> Result<ResolvedModule, ResolutionError> {
        if let Some(path) = self.resolve_alias(&spec.text) {
            tracing::debug!(specifier = %spec.text, path = %path.display(), "Resolved alias");
            return Ok(self.resolved(path, ResolutionStep::Alias));
        }

        if spec.is_relative() {
            let path = spec.importer_dir().join(&spec.text).clean();
            tracing::debug!(specifier = %spec.text, path = %path.display(), "Resolved relative import");
            return Ok(self.resolved(path, ResolutionStep::Relative));
        }

        match self.resolve_package(spec)? {
            PackageHit::File(path) => {
                tracing::debug!(specifier = %spec.text, path = %path.display(), "Resolved package import");
                Ok(self.resolved(path, ResolutionStep::Package))
            }
            PackageHit::Ignored(path) => {
                tracing::debug!(specifier = %spec.text, path = %path.display(), "Import disabled by browser field");
                Ok(ResolvedModule {
                    path,
                    namespace: Namespace::Ignored,
                    step: ResolutionStep::Package,
                })
            }
        }
    }

    fn resolve_alias(&self, specifier: &str) -> Option<PathBuf> {
        self.aliases
            .candidates(specifier)
            .find_map(|(_, substituted)| find_alias_target(&substituted))
    }

    fn resolve_package(&self, spec: &ImportSpecifier) -> Result<PackageHit, ResolutionError> {
        let failure = |reason: String| ResolutionError {
            specifier: spec.text.clone(),
            importer: spec.importer.clone(),
            reason,
        };

        let path = match self.packages.resolve(spec.importer_dir(), &spec.text) {
            Ok(resolution) => resolution.path().to_path_buf(),
            Err(oxc_resolver::ResolveError::Ignored(path)) => return Ok(PackageHit::Ignored(path)),
            Err(e) => return Err(failure(e.to_string())),
        };

        // The resolver walks up past the workspace; packages found there are
        // not part of this checkout.
        if !path.starts_with(self.workspace.root()) {
            return Err(failure(format!(
                "resolved outside the workspace to {}",
                path.display()
            )));
        }

        Ok(PackageHit::File(path))
    }

    fn resolved(&self, path: PathBuf, step: ResolutionStep) -> ResolvedModule {
        let namespace = namespace_for(&self.workspace, &path);
        ResolvedModule {
            path,
            namespace,
            step,
        }
    }
}

enum PackageHit {
    File(PathBuf),
    Ignored(PathBuf),
}

/// Namespace of a file path, from its name and location alone.
pub fn namespace_for(workspace: &Workspace, path: &Path) -> Namespace {
    match classify(path) {
        Some(StylesheetKind::Scoped) => Namespace::CssModule,
        Some(StylesheetKind::Global) => Namespace::CssGlobal,
        None if workspace.is_dependency(path) => Namespace::External,
        None => Namespace::Local,
    }
}

fn find_alias_target(substituted: &Path) -> Option<PathBuf> {
    if substituted.extension().is_some() && substituted.is_file() {
        return Some(substituted.to_path_buf());
    }

    let base = substituted.as_os_str();
    ALIAS_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut candidate = base.to_os_string();
            candidate.push(ext);
            PathBuf::from(candidate)
        })
        .chain(
            ALIAS_EXTENSIONS
                .iter()
                .map(|ext| substituted.join(format!("index{}", ext))),
        )
        .find(|candidate| candidate.is_file())
}
