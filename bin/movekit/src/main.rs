//! Movekit CLI
//!
//! Validates the deployment environment of a Movekit site. Exits non-zero
//! when any check fails, so it can gate a build pipeline.

use clap::Parser;
use color_eyre::eyre::Result;
use movekit::cmd::check::{self, CheckOptions};

/// Command-line interface for Movekit.
#[derive(Parser)]
#[command(
    name = "movekit",
    version,
    about = "Validate a Movekit site's environment variables before building"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,

    /// TOML file with the build-injected environment, used when the
    /// process environment is empty
    #[arg(long, value_name = "FILE")]
    injected: Option<std::path::PathBuf>,

    /// Also validate content collections under this directory
    #[arg(long, value_name = "DIR")]
    content: Option<std::path::PathBuf>,
}

impl Cli {
    fn check_options(&self) -> CheckOptions {
        CheckOptions {
            strict: self.strict,
            injected: self.injected.clone(),
            content_dir: self.content.clone(),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    movekit::init_tracing(cli.verbose);

    check::run(&cli.check_options())
}
