//! BCAT command-line tool.

mod cli;
mod commands;
mod config;
mod logging;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();
    logging::init_logging(&cli.logs)?;
    debug!(version = env!("CARGO_PKG_VERSION"), "starting bcat");

    commands::run(cli).await
}
