//! Rolldown plugins that wire workspace resolution and loading into the
//! bundler.
//!
//! - [`WorkspaceResolvePlugin`]: every import goes through
//!   [`ModuleResolver`](crate::resolver::ModuleResolver)
//! - [`SourceLoaderPlugin`]: per-extension loaders for workspace sources and
//!   empty modules for imports a `browser` field disables
//! - stylesheets are loaded by `vessel_plugin_css::VesselCssPlugin`, which
//!   reads each stylesheet's kind from the shared [`ModuleTable`]

pub mod registry;
pub mod resolve;
pub mod source_loader;

pub use registry::{PluginPhase, PluginRegistry, VesselPlugin};
pub use resolve::{FailureSlot, ModuleTable, WorkspaceResolvePlugin};
pub use source_loader::SourceLoaderPlugin;
