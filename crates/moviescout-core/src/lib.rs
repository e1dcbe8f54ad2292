// Client-side state core - favorites, notifications, and the session that ties them to search
pub mod config;
pub mod debounce;
pub mod error;
pub mod explorer;
pub mod favorites;
pub mod notifications;

pub use config::Config;
pub use debounce::{debounce, Debouncer};
pub use error::Error;
pub use explorer::{Explorer, MovieCard};
pub use favorites::FavoritesStore;
pub use notifications::{Message, NotificationQueue, Severity};

// The catalog types show up in every public signature here
pub use moviescout_api::{Movie, SearchClient, SearchError, SearchParams, SearchResult};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
