//! Command-line interface.
//!
//! - `vessel serve` - run the bundling HTTP service

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use figment::providers::Serialized;
use serde::Serialize;
use vessel_config::{OutputMode, ServerSettings};

use crate::error::Result;

/// Vessel - component preview bundling service
#[derive(Parser, Debug)]
#[command(
    name = "vessel",
    version,
    about = "Bundle a UI component from a git repository into a browser preview",
    long_about = "Vessel clones a component repository, installs its dependencies and links a\n\
                  single entry into an HTML document plus an ESM bundle, served over HTTP."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP service
    Serve(ServeArgs),
}

/// Arguments for `vessel serve`. Flags override `vessel.toml` and
/// `VESSEL_*` environment variables.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Path to a settings file (default: ./vessel.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How the host document references the bundle
    #[arg(long, value_name = "MODE")]
    pub output_mode: Option<OutputMode>,

    /// Persist each artifact to the output directory
    #[arg(long)]
    pub debug: bool,
}

/// Only the flags the user actually passed; merged last.
#[derive(Debug, Default, Serialize)]
struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_mode: Option<OutputMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<bool>,
}

impl ServeArgs {
    /// Resolve the final settings: defaults, config file, environment, flags.
    pub fn settings(&self) -> Result<ServerSettings> {
        let overrides = SettingsOverrides {
            host: self.host.clone(),
            port: self.port,
            output_mode: self.output_mode,
            debug: self.debug.then_some(true),
        };
        let figment =
            ServerSettings::figment(self.config.as_deref())?.merge(Serialized::defaults(overrides));
        Ok(ServerSettings::extract(figment)?)
    }
}
