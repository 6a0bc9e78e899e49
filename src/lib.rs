pub mod client;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

use anyhow::Result;
use tracing::{debug, info};

/// Runs the quote service until Ctrl-C.
pub async fn run_server(config_path: Option<&str>) -> Result<()> {
    info!("Quote service starting...");

    let config = crate::core::config::AppConfig::resolve(config_path)?;
    debug!("Loaded config: {config:#?}");

    let state = server::state_from_config(&config.server)?;
    let quote_server = server::QuoteServer::bind(config.server.listen_addr, state).await?;

    let cancel_token = quote_server.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            cancel_token.cancel();
        }
    });

    quote_server.run().await
}

/// Runs one client fetch-and-cache cycle.
pub async fn run_client(config_path: Option<&str>) -> Result<()> {
    let config = crate::core::config::AppConfig::resolve(config_path)?;
    debug!("Loaded config: {config:#?}");

    client::run(&config.client).await?;
    Ok(())
}
