use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crackfleet::config::MasterConfig;
use crackfleet::master::orchestrator::Orchestrator;

#[derive(Parser, Debug)]
#[command(name = "master")]
#[command(about = "Coordinator: distributes MD5 cracking work over a minion fleet")]
struct Args {
    /// Input file with one MD5 hash per line
    input_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = MasterConfig::from_env()?;

    tracing::info!(
        input = %args.input_file.display(),
        minions = config.minion_urls.len(),
        output = %config.output_file,
        "Starting master"
    );

    // Startup failures (bad config, unreadable input) exit non-zero; failed
    // hashes do not, they are regular output records.
    let orchestrator = Orchestrator::new(config)?;
    let input = std::fs::read_to_string(&args.input_file)?;

    orchestrator.probe_fleet().await;
    orchestrator.run(&input).await?;

    Ok(())
}
