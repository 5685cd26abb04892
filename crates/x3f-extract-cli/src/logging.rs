//! Two-channel log output.
//!
//! Progress (INFO and more verbose) goes to stdout, diagnostics (WARN and
//! ERROR) go to stderr. `RUST_LOG` narrows both.

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, LevelFilter, filter_fn};
use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }

    /// Most verbose level printed on the progress channel.
    pub fn progress_level(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::OFF,
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
        }
    }
}

pub fn init(verbosity: Verbosity) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "trace".into());

    let max = verbosity.progress_level();
    let progress = fmt::layer()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_filter(filter_fn(move |meta| {
            let level = *meta.level();
            level >= Level::INFO && max >= level
        }));

    let diagnostics = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(progress)
        .with(diagnostics)
        .try_init()
        .context("Failed to set tracing subscriber")
}
