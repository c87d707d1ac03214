//! s3dist - releases from an object store bucket

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use s3dist_cli::cmd;
use s3dist_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let backend = cli.backend.build()?;

    match cli.command {
        Commands::List { channel, json } => {
            cmd::list::list(backend.as_ref(), channel.as_deref(), json).await
        }
        Commands::Url { tag, asset } => cmd::url::url(backend.as_ref(), &tag, &asset).await,
        Commands::Fetch { tag, asset, output } => {
            cmd::fetch::fetch(backend.as_ref(), &tag, &asset, output.as_deref()).await
        }
    }
}
