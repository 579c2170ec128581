//! Logging setup for the vessel binary.
//!
//! Structured logging through `tracing`. Verbosity comes from the global
//! flags; without them `RUST_LOG` is honored, falling back to INFO for the
//! vessel crates.
//!
//! ```rust,no_run
//! use vessel_server::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Listening");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str =
    "vessel=debug,vessel_server=debug,vessel_bundler=debug,vessel_config=debug,vessel_plugin_css=debug";
const QUIET_FILTER: &str = "vessel=error,vessel_server=error";
const DEFAULT_FILTER: &str =
    "vessel=info,vessel_server=info,vessel_bundler=info,vessel_config=info,vessel_plugin_css=info";

/// Initialize the global tracing subscriber. Call once, before any logging.
///
/// Priority: `verbose` (DEBUG), then `quiet` (ERROR only), then `RUST_LOG`,
/// then INFO for the vessel crates.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logging with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Whether colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them; otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
