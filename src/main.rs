mod auth;
mod board;
mod cancel;
mod cli;
mod config;
mod error;
mod output;
mod providers;
mod registry;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting ciboard - GitLab pipeline board");
    cli.execute().await?;

    Ok(())
}
