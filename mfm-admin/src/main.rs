//! Points manual catalog operator tool.
//!
//! Usage:
//!   mfm-admin --db mfm.sqlite import manual.json --label 2025.2 --release-date 2025-06-01 --latest
//!   mfm-admin unit-points Orks Boyz 10 --at 2025.1
//!
//! Set `RUST_LOG` for fine-grained log filtering; otherwise `--verbose`
//! switches between info and debug.

use anyhow::Result;
use clap::Parser;
use mfm_admin::{execute, Cli};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = std::io::stdout();
    execute(&cli, &mut stdout.lock())
}

fn init_logging(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
        return;
    }

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
