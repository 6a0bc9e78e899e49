pub mod handler;

use crate::core::config::ServerConfig;
use crate::providers::AwesomeApiProvider;
use crate::store::SqliteQuoteStore;
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use handler::{AppState, get_quote};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/cotacao", get(get_quote))
        .with_state(state)
}

/// Wires the upstream provider and the SQLite store from `config`.
pub fn state_from_config(config: &ServerConfig) -> Result<AppState> {
    let provider = AwesomeApiProvider::new(&config.upstream.base_url)
        .with_strict_pair(config.upstream.strict_pair);
    let store = SqliteQuoteStore::new(&config.database_url)
        .with_context(|| format!("Invalid database url: {}", config.database_url))?;

    Ok(AppState::new(
        Arc::new(provider),
        Arc::new(store),
        config.pair()?,
        config.fetch_deadline(),
        config.persist_deadline(),
    ))
}

pub struct QuoteServer {
    listener: TcpListener,
    state: AppState,
    cancel_token: CancellationToken,
}

impl QuoteServer {
    pub async fn bind(addr: SocketAddr, state: AppState) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Ok(Self {
            listener,
            state,
            cancel_token: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Cancelling the token stops accepting connections and lets in-flight
    /// requests and their quote writes finish.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub async fn run(self) -> Result<()> {
        info!("Quote service listening on {}", self.local_addr()?);

        let cancel_token = self.cancel_token;
        axum::serve(self.listener, router(self.state.clone()))
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
            })
            .await?;

        self.state.drain_persist_tasks().await;

        info!("Quote service stopped");
        Ok(())
    }
}
