//! Error types for the vessel service.
//!
//! Every failure past request parsing is a [`ServerError`]. The HTTP layer
//! reports them all the same way (`500` with `{html: null, js: null, error}`);
//! the CLI turns them into miette reports via [`server_error_to_miette`].

use miette::Report;
use thiserror::Error;
use vessel_config::ConfigError;

/// Top-level service error.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Clone, manifest or dependency install failed.
    #[error("Provisioning failed: {0}")]
    Provisioning(#[from] ProvisionError),

    /// Resolution, linking or artifact assembly failed.
    #[error("Bundling failed: {0}")]
    Bundle(#[from] vessel_bundler::Error),

    /// The request did not finish inside its deadline.
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Binding or serving the HTTP listener failed.
    #[error("Server error: {0}")]
    Server(String),
}

/// Failures of the provisioning collaborators.
///
/// The `reason` of a clone or install failure carries raw tool output
/// (stderr, local paths). It is logged where the failure happens and kept
/// out of `Display`, which ends up in HTTP responses.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("could not clone branch '{branch}' of {url}")]
    Clone {
        url: String,
        branch: String,
        reason: String,
    },

    #[error("dependency install failed")]
    Install { reason: String },

    /// The checkout has no readable `package.json`.
    #[error("unusable package manifest: {0}")]
    Manifest(#[source] ConfigError),
}

impl ProvisionError {
    /// Tool output behind a clone or install failure.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ProvisionError::Clone { reason, .. } | ProvisionError::Install { reason } => {
                Some(reason)
            }
            ProvisionError::Manifest(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Convert ServerError to miette Report
pub fn server_error_to_miette(err: ServerError) -> Report {
    match err {
        ServerError::Bundle(e) => Report::new(e),
        ServerError::Config(e) => miette::miette!(
            "Configuration error: {}\n\nHint: Check vessel.toml and VESSEL_* environment variables",
            e
        ),
        ServerError::Server(msg) => miette::miette!("Server error: {}", msg),
        _ => miette::miette!("{}", err),
    }
}
