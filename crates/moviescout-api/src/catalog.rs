use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::models::{SearchParams, SearchResult};
use crate::transport::{HttpTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "https://jsonmock.hackerrank.com/api/movies/search";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    /// A newer search was issued while this one was in flight
    #[error("Stale response discarded")]
    Stale,

    #[error("Failed to fetch movies (status {status})")]
    ApiError { status: u16 },

    #[error("{0}")]
    Unknown(String),
}

impl SearchError {
    pub fn is_stale(&self) -> bool {
        matches!(self, SearchError::Stale)
    }

    /// HTTP status carried by `ApiError`, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::ApiError { status } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Map filters onto the catalog's query parameters
///
/// Parameter names are case-sensitive on the catalog side. Absent or empty
/// filters are left out; `page` is always sent and defaults to 1.
pub fn build_query(params: &SearchParams) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(4);

    let filters = [
        ("Title", &params.title),
        ("Year", &params.year),
        ("imdbID", &params.id),
    ];
    for (name, value) in filters {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            pairs.push((name, urlencoding::encode(value).into_owned()));
        }
    }
    pairs.push(("page", params.page.unwrap_or(1).to_string()));

    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Client for the movie catalog search endpoint
///
/// Every call to [`SearchClient::search`] bumps the request epoch. A call only
/// resolves successfully if no newer call was issued while it was in flight;
/// otherwise it fails with [`SearchError::Stale`], whatever order the
/// responses come back in.
pub struct SearchClient<T = HttpTransport> {
    transport: T,
    base_url: String,
    timeout: Duration,
    epoch: AtomicU64,
}

impl SearchClient<HttpTransport> {
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }
}

impl Default for SearchClient<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> SearchClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            epoch: AtomicU64::new(0),
        }
    }

    /// Point the client at another catalog instance
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Epoch of the most recently issued search
    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Full request URL for a set of filters
    pub fn request_url(&self, params: &SearchParams) -> String {
        format!("{}?{}", self.base_url, build_query(params))
    }

    /// Search the catalog
    ///
    /// The epoch is taken when this is called, not when the returned future
    /// is first polled, so issue order is call order.
    pub fn search(&self, params: &SearchParams) -> impl Future<Output = Result<SearchResult>> + '_ {
        let request_epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let url = self.request_url(params);

        async move {
            debug!("Search #{} issued: {}", request_epoch, url);

            // Dropping the transport future on timeout aborts the request and
            // the timer goes with it.
            let response = match timeout(self.timeout, self.transport.get(&url)).await {
                Err(_) => {
                    debug!("Search #{} timed out after {:?}", request_epoch, self.timeout);
                    return Err(SearchError::Timeout);
                }
                Ok(Err(message)) => return Err(SearchError::Unknown(message)),
                Ok(Ok(response)) => response,
            };

            let current = self.current_epoch();
            if current != request_epoch {
                debug!(
                    "Search #{} discarded, superseded by #{}",
                    request_epoch, current
                );
                return Err(SearchError::Stale);
            }

            if !response.is_success() {
                return Err(SearchError::ApiError {
                    status: response.status,
                });
            }

            let result: SearchResult = serde_json::from_str(&response.body)
                .map_err(|e| SearchError::Unknown(format!("Invalid catalog response: {}", e)))?;

            debug!(
                "Search #{} resolved with {} items (page {}/{})",
                request_epoch,
                result.items.len(),
                result.page,
                result.total_pages
            );
            Ok(result)
        }
    }
}
