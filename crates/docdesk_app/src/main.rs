mod cli;
mod commands;
mod config;
mod logging;
mod terminal;

use std::process::ExitCode;

use clap::Parser;
use docdesk_logging::desk_info;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    logging::initialize(cli.log);
    desk_info!("docdesk {} starting", env!("CARGO_PKG_VERSION"));

    let config = config::load(cli.config.as_deref())?;
    commands::run(cli, config).await
}
