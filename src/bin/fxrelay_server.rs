use anyhow::Result;
use clap::Parser;
use fxrelay::core::log::init_logging;

/// Serves the current dollar quote on GET /cotacao
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

    let result = fxrelay::run_server(cli.config_path.as_deref()).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Quote service failed");
    }
    result
}
