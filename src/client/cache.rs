use crate::core::{PersistError, QuoteProjection};
use std::path::Path;
use tracing::debug;

pub fn render(projection: &QuoteProjection) -> String {
    format!("Dolár: {}\n", projection.bid)
}

/// Replaces the whole content of the cache file at `path` with the bid.
pub async fn write_cache(path: &Path, projection: &QuoteProjection) -> Result<(), PersistError> {
    debug!(path = %path.display(), bid = %projection.bid, "Saving quote");
    tokio::fs::write(path, render(projection))
        .await
        .map_err(|source| PersistError::CacheFile {
            path: path.to_path_buf(),
            source,
        })
}
