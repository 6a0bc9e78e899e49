//! Durable quote history abstraction

use crate::core::error::PersistError;
use crate::core::quote::RawQuote;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Appends one row holding every field of `quote`.
    ///
    /// Implementations must give up once `deadline` elapses and, when they
    /// report `PersistError::DeadlineExceeded`, must not have written the row.
    async fn append(&self, quote: &RawQuote, deadline: Duration) -> Result<(), PersistError>;
}

/// Appends `quote` to `store` within `deadline`. Any error leaves the store
/// unchanged.
pub async fn persist_quote(
    store: &dyn QuoteStore,
    quote: &RawQuote,
    deadline: Duration,
) -> Result<(), PersistError> {
    let result = store.append(quote, deadline).await;
    if let Err(PersistError::DeadlineExceeded(_)) = &result {
        debug!(?deadline, "Store write abandoned");
    }
    result
}
