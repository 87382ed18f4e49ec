//! keepsafe CLI entry point.

use clap::Parser;
use keepsafe_cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays clean for bare values; the default
    // level never includes secret material.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keepsafe=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("keepsafe: {e:#}");
        std::process::exit(1);
    }
}
