use crate::core::{PersistError, QuoteStore, RawQuote};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Executor, Statement};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

const INSERT_QUOTE: &str = "INSERT INTO cotations(Code, Codein, Name, High, Low, VarBid, PctChange, Bid, Ask, Timestamp, CreateDate)
    VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// SQLite-backed quote history. Every append opens its own connection and
/// closes it before returning; concurrent appends rely on SQLite's locking.
pub struct SqliteQuoteStore {
    options: SqliteConnectOptions,
}

impl SqliteQuoteStore {
    /// The database and its `cotations` table must already exist.
    pub fn new(database_url: &str) -> Result<Self, PersistError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(PersistError::Connect)?
            .create_if_missing(false);
        Ok(Self { options })
    }

    async fn connect(&self) -> Result<SqliteConnection, PersistError> {
        self.options
            .connect()
            .await
            .map_err(PersistError::Connect)
    }
}

async fn insert(conn: &mut SqliteConnection, quote: &RawQuote) -> Result<(), PersistError> {
    let statement = (&mut *conn)
        .prepare(INSERT_QUOTE)
        .await
        .map_err(PersistError::Prepare)?;

    statement
        .query()
        .bind(quote.code.as_str())
        .bind(quote.codein.as_str())
        .bind(quote.name.as_str())
        .bind(quote.high.as_str())
        .bind(quote.low.as_str())
        .bind(quote.var_bid.as_str())
        .bind(quote.pct_change.as_str())
        .bind(quote.bid.as_str())
        .bind(quote.ask.as_str())
        .bind(quote.timestamp.as_str())
        .bind(quote.create_date.as_str())
        .execute(&mut *conn)
        .await
        .map_err(PersistError::Execute)?;
    Ok(())
}

#[async_trait]
impl QuoteStore for SqliteQuoteStore {
    /// The insert runs inside a transaction. If the deadline elapses before
    /// the commit is issued, the transaction is dropped and rolled back.
    async fn append(&self, quote: &RawQuote, deadline: Duration) -> Result<(), PersistError> {
        let expires = Instant::now() + deadline;
        let elapsed = move |_: Elapsed| PersistError::DeadlineExceeded(deadline);

        let mut conn = timeout_at(expires, self.connect()).await.map_err(elapsed)??;
        let mut tx = timeout_at(expires, conn.begin())
            .await
            .map_err(elapsed)?
            .map_err(PersistError::Execute)?;
        timeout_at(expires, insert(&mut tx, quote))
            .await
            .map_err(elapsed)??;

        // Not bounded: abandoning an issued commit could still land the row
        tx.commit().await.map_err(PersistError::Execute)?;
        debug!(bid = %quote.bid, "Quote row appended");

        if let Err(e) = conn.close().await {
            debug!("Failed to close store connection: {}", e);
        }
        Ok(())
    }
}
