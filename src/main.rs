//! apifilter CLI entry point
//!
//! Installs logging, then delegates everything to the CLI module. Logs go to
//! stderr so stdout carries only the JSON response.

use apifilter::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("{}: {}", e.code(), e);
        std::process::exit(1);
    }
}
