//! Event logger host daemon - Main Entry Point

use anyhow::Result;
use clap::Parser;

mod cli;
mod host;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = cli::Cli::parse();
    cli::run(cli).await
}
