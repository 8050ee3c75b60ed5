use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bookforge_cli::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let svc = bookforge_cli::service_for(&cli);
    let mut stdout = std::io::stdout().lock();
    bookforge_cli::run(cli, &svc, &mut stdout).await
}
