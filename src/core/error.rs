//! Error taxonomy for each hop of the quote pipeline

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the upstream quote provider.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("fetch deadline must be positive")]
    InvalidDeadline,

    #[error("upstream did not respond within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("upstream body is not a valid quote map: {0}")]
    Decode(#[from] serde_json::Error),

    /// Only raised when strict pair handling is enabled.
    #[error("pair {0} missing from upstream response")]
    PairNotFound(String),
}

/// Failures writing a quote to durable storage, either the server's store or
/// the client's cache file.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to open store connection: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to prepare insert statement: {0}")]
    Prepare(#[source] sqlx::Error),

    #[error("failed to execute insert: {0}")]
    Execute(#[source] sqlx::Error),

    #[error("store write did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write cache file {}: {source}", path.display())]
    CacheFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures calling the quote service from the client.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("quote service did not respond within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("quote service transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("quote service returned status {0}")]
    Status(reqwest::StatusCode),
}

/// The quote service answered, but not with a projection.
#[derive(Error, Debug)]
#[error("malformed quote response: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);
