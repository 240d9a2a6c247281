mod cache;
mod catalog;
mod cli;
mod config;
mod format;
mod store;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("katalog=info")),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = cli::Args::parse();
  cli::run(args).await
}
