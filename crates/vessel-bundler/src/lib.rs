//! # vessel-bundler
//!
//! Bundles a provisioned component repository into a browser artifact.
//!
//! Given a [`Workspace`] (a checkout with its dependency directory already
//! installed), [`bundle_workspace`]:
//!
//! 1. builds an [`AliasTable`](vessel_config::AliasTable) from `tsconfig.json`
//! 2. discovers global stylesheets ([`discover_global_stylesheets`])
//! 3. writes a synthetic `__entry.tsx` ([`entry::synthesize`])
//! 4. links everything reachable from it into one minified ESM chunk with
//!    Rolldown, resolving imports through [`ModuleResolver`]
//! 5. wraps the chunk in a host document ([`Artifact`])
//!
//! ## Example
//!
//! ```no_run
//! use vessel_bundler::{BundleOptions, EntryOptions, Workspace, bundle_workspace};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let workspace = Workspace::open("/tmp/checkout", "node_modules")?;
//! let options = BundleOptions::new().entry(
//!     EntryOptions::new()
//!         .imports(["import { Button } from '@/components/ui/button';"])
//!         .render_body("const App = () => <Button>Preview</Button>;"),
//! );
//! let outcome = bundle_workspace(&workspace, &options).await?;
//! println!("{} bytes of JS", outcome.artifact.js.len());
//! # Ok(()) }
//! ```

pub mod artifact;
pub mod build;
pub mod diagnostics;
pub mod discovery;
pub mod entry;
pub mod plugins;
pub mod resolver;
pub mod workspace;

pub use artifact::Artifact;
pub use build::{BundleOptions, BundleOutcome, bundle_workspace, link};
pub use discovery::{StylesheetAsset, discover_global_stylesheets};
pub use entry::EntryOptions;
pub use resolver::{
    ImportSpecifier, ModuleResolver, Namespace, ResolutionError, ResolutionStep, ResolvedModule,
};
pub use workspace::{DEFAULT_DEPENDENCY_DIR, Workspace};

pub use vessel_config::OutputMode;
pub use vessel_plugin_css::{IdSource, RandomIds, SequentialIds};

/// Error types for vessel-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An import could not be mapped to a file.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Error from Rolldown bundler.
    #[error("Rolldown bundler error: {}", format_bundler_error(.0))]
    Bundler(Vec<diagnostics::ExtractedDiagnostic>),

    /// Workspace configuration could not be read.
    #[error("Workspace configuration error: {0}")]
    Config(#[from] vessel_config::ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rolldown produced output we cannot turn into an artifact.
    #[error("Invalid bundle output: {0}")]
    InvalidOutput(String),
}

/// Result type alias for vessel-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a Rolldown error.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(diagnostics::extract_from_rolldown_error(error))
    }
}

fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    match diagnostics {
        [] => "Unknown bundler error".to_string(),
        [diag] => format!("{}: {}", diag.kind, diag.message),
        _ => format!(
            "{} errors: {}",
            diagnostics.len(),
            diagnostics
                .iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Resolution(_) => "RESOLUTION_ERROR",
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::InvalidOutput(_) => "INVALID_OUTPUT",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Resolution(err) => Some(Box::new(format!(
                "Check that '{}' is listed in package.json or matches a tsconfig path alias.",
                err.specifier
            ))),
            Error::Config(_) => Some(Box::new(
                "The repository must contain a valid package.json at its root.",
            )),
            Error::Bundler(diagnostics) => match diagnostics.as_slice() {
                [diag] => diag
                    .help
                    .as_ref()
                    .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>),
                [] => None,
                _ => Some(Box::new(
                    "Multiple bundler errors occurred. See details below.",
                )),
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;
    use std::path::PathBuf;

    #[test]
    fn test_resolution_error_message_and_code() {
        let err = Error::from(ResolutionError {
            specifier: "@acme/missing".to_string(),
            importer: PathBuf::from("/w/src/app.tsx"),
            reason: "Cannot find module".to_string(),
        });
        let message = err.to_string();
        assert!(message.contains("@acme/missing"));
        assert!(message.contains("/w/src/app.tsx"));
        assert_eq!(err.code().unwrap().to_string(), "RESOLUTION_ERROR");
        assert!(err.help().unwrap().to_string().contains("@acme/missing"));
    }

    #[test]
    fn test_bundler_error_formatting() {
        let single = Error::Bundler(vec![diagnostics::ExtractedDiagnostic::other(
            "BuildError",
            "boom",
        )]);
        assert_eq!(single.to_string(), "Rolldown bundler error: BuildError: boom");

        let empty = Error::Bundler(Vec::new());
        assert_eq!(empty.to_string(), "Rolldown bundler error: Unknown bundler error");
    }
}
