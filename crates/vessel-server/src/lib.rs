//! # vessel-server
//!
//! HTTP service that turns a component repository into a browser preview.
//!
//! Per request it clones the repository into a fresh scratch directory
//! ([`scratch::ScratchDir`]), installs dependencies ([`provision`]), bundles
//! the caller's entry with [`vessel_bundler`] and deletes the directory
//! again, whatever the outcome.

pub mod cli;
pub mod error;
pub mod logger;
pub mod provision;
pub mod scratch;
pub mod server;
pub mod service;

pub use error::{ProvisionError, Result, ServerError};
pub use provision::{
    CommandPackageManager, GitCli, PackageManager, Provisioner, SourceControl, clone_with_fallback,
};
pub use scratch::ScratchDir;
pub use server::{BundleResponse, router, serve};
pub use service::{BundleRequest, BundleService};
