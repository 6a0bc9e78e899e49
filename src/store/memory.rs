use crate::core::{PersistError, QuoteStore, RawQuote};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// In-process quote history with optional artificial latency and forced
/// failure, for exercising the pipeline without a database.
#[derive(Clone, Default)]
pub struct MemoryQuoteStore {
    rows: Arc<Mutex<Vec<RawQuote>>>,
    delay: Option<Duration>,
    unavailable: bool,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every append sleeps for `delay` before writing, and gives up without
    /// writing if its deadline elapses first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every append fails without writing.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub async fn rows(&self) -> Vec<RawQuote> {
        self.rows.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl QuoteStore for MemoryQuoteStore {
    async fn append(&self, quote: &RawQuote, deadline: Duration) -> Result<(), PersistError> {
        if let Some(delay) = self.delay {
            if tokio::time::timeout(deadline, tokio::time::sleep(delay))
                .await
                .is_err()
            {
                return Err(PersistError::DeadlineExceeded(deadline));
            }
        }
        if self.unavailable {
            return Err(PersistError::Unavailable("memory store disabled".to_string()));
        }
        self.rows.lock().await.push(quote.clone());
        debug!(bid = %quote.bid, "Quote row appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persist_quote;

    fn quote(bid: &str) -> RawQuote {
        RawQuote {
            bid: bid.to_string(),
            ..RawQuote::default()
        }
    }

    #[tokio::test]
    async fn test_append_is_ordered_history() {
        let store = MemoryQuoteStore::new();
        assert!(store.is_empty().await);

        store.append(&quote("5.43"), Duration::from_secs(1)).await.unwrap();
        store.append(&quote("5.43"), Duration::from_secs(1)).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.bid == "5.43"));
    }

    #[tokio::test]
    async fn test_unavailable_store_writes_nothing() {
        let store = MemoryQuoteStore::new().unavailable();

        let result = persist_quote(&store, &quote("5.43"), Duration::from_secs(1)).await;

        assert!(matches!(result, Err(PersistError::Unavailable(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_persist_deadline_abandons_write() {
        let store = MemoryQuoteStore::new().with_delay(Duration::from_millis(200));

        let result = persist_quote(&store, &quote("5.43"), Duration::from_millis(10)).await;

        assert!(matches!(result, Err(PersistError::DeadlineExceeded(d)) if d == Duration::from_millis(10)));
        // The abandoned write must not land later either
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_persist_within_deadline() {
        let store = MemoryQuoteStore::new().with_delay(Duration::from_millis(5));

        persist_quote(&store, &quote("5.43"), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(store.rows().await[0].bid, "5.43");
    }
}
