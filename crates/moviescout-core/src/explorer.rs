// Session glue - what a front-end does with the three building blocks
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use moviescout_api::{HttpTransport, Movie, SearchClient, SearchParams, SearchResult, Transport};
use moviescout_cache::{KeyValueStore, MemoryStore, SqliteStore};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::favorites::FavoritesStore;
use crate::notifications::{Message, NotificationQueue, Severity};
use crate::Result;

/// A search hit paired with its favorite status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieCard {
    pub movie: Movie,
    pub favorite: bool,
}

/// Orchestrates search, favorites and notifications for one user session
///
/// The components stay independent; this only wires their outcomes
/// together the way the UI expects (failed searches and favorite toggles
/// surface as messages). Locks are never held across an await, so searches
/// may overlap.
pub struct Explorer<T = HttpTransport> {
    client: SearchClient<T>,
    favorites: Mutex<FavoritesStore>,
    notifications: Mutex<NotificationQueue>,
}

impl Explorer<HttpTransport> {
    /// Build a session from configuration
    ///
    /// If the storage file can't be opened, favorites fall back to memory
    /// for this run.
    pub fn from_config(config: &Config) -> Self {
        let client = SearchClient::new()
            .with_base_url(config.catalog.base_url.clone())
            .with_timeout(config.catalog.timeout());

        let favorites = FavoritesStore::with_key(
            open_storage(config),
            config.storage.favorites_key.clone(),
        );

        Self::new(
            client,
            favorites,
            NotificationQueue::with_capacity(config.notifications.capacity),
        )
    }
}

fn open_storage(config: &Config) -> Box<dyn KeyValueStore> {
    let opened = config
        .storage
        .resolved_path()
        .and_then(|path| Ok(SqliteStore::open(path)?));

    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("Storage unavailable, favorites will not persist: {}", e);
            Box::new(MemoryStore::new())
        }
    }
}

impl<T: Transport> Explorer<T> {
    pub fn new(
        client: SearchClient<T>,
        favorites: FavoritesStore,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            client,
            favorites: Mutex::new(favorites),
            notifications: Mutex::new(notifications),
        }
    }

    pub fn client(&self) -> &SearchClient<T> {
        &self.client
    }

    /// Run a search
    ///
    /// The search is issued when this is called, so of several searches
    /// created before any is awaited, only the last one can succeed.
    /// `Ok(None)` means a newer search superseded this one; nothing is
    /// reported for that. Any other failure is queued as an error message
    /// and returned.
    pub fn search(
        &self,
        params: &SearchParams,
    ) -> impl Future<Output = Result<Option<SearchResult>>> + '_ {
        let pending = self.client.search(params);

        async move {
            match pending.await {
                Ok(result) => {
                    info!("Found {} movies ({} total)", result.items.len(), result.total);
                    Ok(Some(result))
                }
                Err(e) if e.is_stale() => {
                    debug!("Ignoring superseded search");
                    Ok(None)
                }
                Err(e) => {
                    warn!("Search failed: {}", e);
                    self.notify(e.to_string(), Severity::Error);
                    Err(e.into())
                }
            }
        }
    }

    /// Flip a movie's favorite status and report it
    ///
    /// Returns whether the movie is a favorite afterwards.
    pub fn toggle_favorite(&self, movie: Movie) -> bool {
        let title = movie.title.clone();
        let now_favorite = self.favorites().toggle(movie);

        if now_favorite {
            self.notify(format!("{} added to favorites", title), Severity::Success);
        } else {
            self.notify(format!("{} removed from favorites", title), Severity::Warning);
        }
        now_favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites().is_favorite(id)
    }

    /// Snapshot of favorites in insertion order
    pub fn favorite_movies(&self) -> Vec<Movie> {
        self.favorites().favorites().to_vec()
    }

    /// Cross-reference search hits with favorites
    pub fn annotate(&self, result: &SearchResult) -> Vec<MovieCard> {
        let favorites = self.favorites();
        let ids = favorites.ids();
        result
            .items
            .iter()
            .map(|movie| MovieCard {
                favorite: ids.contains(movie.id.as_str()),
                movie: movie.clone(),
            })
            .collect()
    }

    pub fn notify(&self, text: impl Into<String>, severity: Severity) -> u64 {
        self.notifications().add_message(text, severity)
    }

    pub fn dismiss(&self, id: u64) {
        self.notifications().remove(id);
    }

    pub fn clear_messages(&self) {
        self.notifications().clear();
    }

    /// Queued messages, oldest first, leaving the queue as is
    pub fn messages(&self) -> Vec<Message> {
        self.notifications().messages().cloned().collect()
    }

    /// Take every queued message
    pub fn drain_messages(&self) -> Vec<Message> {
        self.notifications().drain()
    }

    fn favorites(&self) -> MutexGuard<'_, FavoritesStore> {
        self.favorites.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notifications(&self) -> MutexGuard<'_, NotificationQueue> {
        self.notifications.lock().unwrap_or_else(|e| e.into_inner())
    }
}
