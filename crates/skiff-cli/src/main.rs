//! skiff entry point.
//!
//! All diagnostics and progress go to stderr; stdout is reserved for file
//! data (`download` pipes there, `ls` prints its rows there).

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use skiff_cli::Cli;
use skiff_core::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing (respects RUST_LOG env var); logs go to stderr so
    // they never mix with downloaded data.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env(cli.silent);

    if let Err(err) = skiff_cli::run(cli, &config).await {
        eprintln!("skiff: {err:#}");
        std::process::exit(1);
    }
}
