use anyhow::{Context, Result};
use clap::Parser;
use shortcut_source::{cli, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let _guard = logging::init(&args.command).context("failed to initialize logging")?;
    tracing::debug!("scsource {} starting", shortcut_source::VERSION);
    cli::run(args).await
}
