use thiserror::Error;

/// All the ways things can go wrong in MovieScout
///
/// Search failures are surfaced as-is so callers can tell a timeout from a
/// stale response. Storage failures only show up here when opening the
/// store; the favorites store swallows everything after that.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Search(#[from] moviescout_api::SearchError),

    #[error("Storage error: {0}")]
    Storage(#[from] moviescout_cache::StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
