use crate::core::{CurrencyPair, QuoteProjection, QuoteProvider, QuoteStore, RawQuote, persist_quote};
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info, info_span, warn};

pub const INTERNAL_ERROR_BODY: &str = "Erro interno";

/// Everything a request needs; shared read-only across requests. The task
/// tracker only registers detached persist tasks so shutdown can wait for them.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn QuoteProvider>,
    pub store: Arc<dyn QuoteStore>,
    pub pair: CurrencyPair,
    pub fetch_deadline: Duration,
    pub persist_deadline: Duration,
    persist_tasks: TaskTracker,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        store: Arc<dyn QuoteStore>,
        pair: CurrencyPair,
        fetch_deadline: Duration,
        persist_deadline: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            pair,
            fetch_deadline,
            persist_deadline,
            persist_tasks: TaskTracker::new(),
        }
    }

    /// Stops accepting new persist tasks and waits for those in flight.
    pub async fn drain_persist_tasks(&self) {
        self.persist_tasks.close();
        if !self.persist_tasks.is_empty() {
            info!(pending = self.persist_tasks.len(), "Waiting for in-flight quote writes");
        }
        self.persist_tasks.wait().await;
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
}

/// Encodes the bid-only projection of `quote` as the success response.
pub fn respond(quote: &RawQuote) -> Result<Response, serde_json::Error> {
    let body = serde_json::to_vec(&QuoteProjection::from(quote))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// `GET /cotacao`
///
/// Fetches under the fetch deadline, encodes the response, and only then
/// hands the same quote to a detached persist task bounded by the persist
/// deadline. Storage latency and storage errors never reach the caller.
pub async fn get_quote(State(state): State<AppState>) -> Response {
    let span = info_span!("quote_request", pair = %state.pair);

    async move {
        debug!("Fetching");
        let quote = match state
            .provider
            .fetch_quote(&state.pair, state.fetch_deadline)
            .await
        {
            Ok(quote) => quote,
            Err(e) => {
                error!(error = %e, "Failed to fetch quote");
                return internal_error();
            }
        };
        debug!(bid = %quote.bid, "Fetched");

        let response = match respond(&quote) {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Failed to encode response");
                return internal_error();
            }
        };
        debug!("Responded");

        let store = Arc::clone(&state.store);
        let deadline = state.persist_deadline;
        state.persist_tasks.spawn(
            async move {
                debug!("Persisting");
                match persist_quote(store.as_ref(), &quote, deadline).await {
                    Ok(()) => debug!("Persisted"),
                    Err(e) => warn!(error = %e, "Failed to persist quote"),
                }
            }
            .in_current_span(),
        );

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_respond_projects_bid() {
        let quote = RawQuote {
            bid: "5.43".to_string(),
            ask: "5.44".to_string(),
            ..RawQuote::default()
        };

        let response = respond(&quote).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"bid":"5.43"}"#);
    }

    #[tokio::test]
    async fn test_internal_error_shape() {
        let response = internal_error();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], INTERNAL_ERROR_BODY.as_bytes());
    }
}
