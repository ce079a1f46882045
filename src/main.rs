mod auth;
mod cli;
mod config;
mod error;
mod output;
mod overview;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting ADOLens - Azure DevOps pipeline overview & business value");
    cli.execute().await?;

    Ok(())
}
