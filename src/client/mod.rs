pub mod cache;

use crate::core::config::ClientConfig;
use crate::core::{DecodeError, PersistError, QuoteProjection, RequestError};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Calls the quote service, bounded by a deadline covering the whole exchange.
pub struct QuoteClient {
    endpoint: String,
    deadline: Duration,
    http: reqwest::Client,
}

impl QuoteClient {
    pub fn new(endpoint: &str, deadline: Duration) -> Self {
        QuoteClient {
            endpoint: endpoint.to_string(),
            deadline,
            http: reqwest::Client::new(),
        }
    }

    async fn request(&self) -> Result<Vec<u8>, RequestError> {
        let response = self.http.get(&self.endpoint).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(RequestError::Status(status));
        }
        Ok(response.bytes().await?.to_vec())
    }

    #[instrument(name = "QuoteServiceCall", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch_quote(&self) -> Result<QuoteProjection, ClientError> {
        let body = tokio::time::timeout(self.deadline, self.request())
            .await
            .map_err(|_| RequestError::DeadlineExceeded(self.deadline))??;
        debug!(bytes = body.len(), "Received quote service response");

        let projection = serde_json::from_slice(&body).map_err(DecodeError::from)?;
        Ok(projection)
    }
}

/// One client run: fetch the projection, then overwrite the cache file.
/// Nothing is written unless the fetch succeeded.
pub async fn run(config: &ClientConfig) -> Result<QuoteProjection, ClientError> {
    let client = QuoteClient::new(&config.endpoint, config.deadline());
    let projection = client.fetch_quote().await?;

    cache::write_cache(&config.cache_path, &projection).await?;
    info!("Dollar quote: {}", projection.bid);
    Ok(projection)
}
