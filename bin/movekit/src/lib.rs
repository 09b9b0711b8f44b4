//! Movekit CLI Library
//!
//! Build-time validation of a Movekit site's deployment environment. The
//! binary entry point is a thin wrapper around [`cmd::check`].
//!
//! # Example
//!
//! ```no_run
//! use movekit::cmd::check::{self, CheckOptions};
//!
//! check::run(&CheckOptions::default()).unwrap();
//! ```

pub mod cmd;

pub use movekit_core::{PublicConfig, ServerConfig, SiteConfig, SiteEnv};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
