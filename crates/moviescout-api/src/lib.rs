// Movie catalog client - query building, timeout and stale-response handling
pub mod catalog;
pub mod models;
pub mod transport;

// Re-export common types
pub use catalog::{build_query, SearchClient, SearchError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use models::{Movie, SearchParams, SearchResult};
pub use transport::{HttpTransport, RawResponse, Transport};
