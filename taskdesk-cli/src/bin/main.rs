use clap::Parser;
use std::fmt::Debug;
use taskdesk_cli::Runner;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the API (saved for later runs)
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Debug print
    #[arg(short, long)]
    debug: bool,
}

fn setup_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_logging(args.debug);
    Ok(Runner::new(args.endpoint, args.debug).await?.run().await?)
}
