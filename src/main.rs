use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use txn_review::application::ViewController;
use txn_review::config::ReviewConfig;
use txn_review::service;

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Review and approve employee card transactions from the terminal"
)]
struct ReviewProgram {
    /// JSON fixture to seed the backend with
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Transactions per page
    #[arg(short, long, default_value_t = 5)]
    page_size: usize,

    /// Simulated backend latency in milliseconds
    #[arg(short, long, default_value_t = 300)]
    latency_ms: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "txn_review=info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = ReviewProgram::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ReviewConfig::builder()
        .page_size(args.page_size)
        .latency(Duration::from_millis(args.latency_ms))
        .fixture(args.data)
        .build();
    tracing::info!("Starting review session with {:?}", config);

    let controller = ViewController::from_config(&config).await?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    service::console::run(&controller, stdin, tokio::io::stdout()).await?;

    tracing::info!("Session closed");
    Ok(())
}
