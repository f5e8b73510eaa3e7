use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crackfleet::config::MinionConfig;
use crackfleet::minion::api::{serve, MinionState};
use crackfleet::shutdown::shutdown_token;

#[derive(Parser, Debug)]
#[command(name = "minion")]
#[command(about = "Worker node: enumerates password ranges over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = MinionConfig::from_env()?;
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;

    tracing::info!(
        addr = %addr,
        worker_threads = config.worker_threads,
        "Starting minion"
    );

    let state = MinionState::new(config);
    let shutdown = shutdown_token();
    serve(addr, state, shutdown).await?;

    Ok(())
}
