//! Logging setup for the `rtscan` binary.
//!
//! The library only emits `tracing` events and spans. Installing a
//! subscriber is left to the binary, which calls [`init_logging`] once at
//! startup.

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log verbosity as accepted by `-v/--verbosity` and `LOG_LEVEL`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum Verbosity {
    Critical,
    Error,
    Warning,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    /// `Critical` has no tracing counterpart and maps to `ERROR`.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Critical | Verbosity::Error => LevelFilter::ERROR,
            Verbosity::Warning => LevelFilter::WARN,
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Trace => LevelFilter::TRACE,
        }
    }
}

/// Installs a compact stderr subscriber filtered at `verbosity`.
///
/// Calling this more than once leaves the first subscriber in place.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.level_filter().into())
        .parse_lossy("");

    let layer = fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
