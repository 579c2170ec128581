//! vessel - component preview bundling service.

use clap::Parser;
use miette::Result;
use vessel_server::service::BundleService;
use vessel_server::{cli, error, logger, server};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let no_color = args.no_color || !logger::should_use_colors();
    logger::init_logger(args.verbose, args.quiet, no_color);

    let result = match args.command {
        cli::Command::Serve(serve_args) => serve(serve_args).await,
    };

    result.map_err(error::server_error_to_miette)
}

async fn serve(args: cli::ServeArgs) -> error::Result<()> {
    let settings = args.settings()?;
    tracing::debug!(?settings, "Loaded settings");
    server::serve(BundleService::from_settings(settings)?).await
}
