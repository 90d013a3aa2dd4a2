//! `pharmacy` command line client

mod cli;
mod logger;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    let cli = cli::Cli::parse();
    logger::init_logger(&cli.log_level, cli.log_json, cli.log_dir.as_deref())?;

    cli::run(cli).await
}
