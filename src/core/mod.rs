//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod quote;
pub mod store;

// Re-export main types for cleaner imports
pub use error::{DecodeError, FetchError, PersistError, RequestError};
pub use quote::{CurrencyPair, QuoteProjection, QuoteProvider, RawQuote};
pub use store::{QuoteStore, persist_quote};
