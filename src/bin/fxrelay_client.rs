use anyhow::Result;
use clap::Parser;
use fxrelay::core::log::init_logging;

/// Fetches the dollar quote from the quote service and saves it locally
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long = "config", value_name = "PATH")]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = fxrelay::run_client(cli.config_path.as_deref()).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Failed to refresh quote");
    }
    result
}
