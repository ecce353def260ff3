//! Command implementations.

pub(crate) mod fetch;
pub(crate) mod inspect;
pub(crate) mod reference;
pub(crate) mod split;

use eyre::Result;

use crate::{
    cli::{Cli, Commands},
    config::BcatConfig,
};

/// Load configuration and dispatch the parsed command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let mut config = BcatConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Split(args) => {
            config.apply_split_args(&args);
            split::run(&args, &config)
        }
        Commands::Reference(args) => reference::run(args),
        Commands::Inspect(args) => inspect::run(&args),
        Commands::Fetch(args) => {
            config.apply_fetch_args(&args);
            fetch::run(&args, &config).await
        }
    }
}
