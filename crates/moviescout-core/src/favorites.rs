use std::collections::HashSet;

use moviescout_api::Movie;
use moviescout_cache::KeyValueStore;
use serde_json::Value;
use tracing::{debug, warn};

pub const STORAGE_KEY: &str = "movie-explorer:favorites";

/// The user's favorite movies, mirrored to durable storage
///
/// The in-memory list is the source of truth once loaded. Storage is written
/// after every mutation; a failed write is logged and otherwise ignored, so
/// favorites keep working in memory for the rest of the session.
pub struct FavoritesStore {
    favorites: Vec<Movie>,
    storage: Box<dyn KeyValueStore>,
    key: String,
}

impl FavoritesStore {
    /// Create a store under the default key and load whatever is persisted
    pub fn new(storage: impl KeyValueStore + 'static) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        let mut store = Self {
            favorites: Vec::new(),
            storage: Box::new(storage),
            key: key.into(),
        };
        store.load_from_storage();
        store
    }

    /// Favorites in the order they were added
    pub fn favorites(&self) -> &[Movie] {
        &self.favorites
    }

    /// Identifiers of every favorite, derived from the current list
    pub fn ids(&self) -> HashSet<&str> {
        self.favorites.iter().map(|m| m.id.as_str()).collect()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn add(&mut self, movie: Movie) {
        if self.is_favorite(&movie.id) {
            return;
        }
        debug!("Adding favorite {}", movie.id);
        self.favorites.push(movie);
        self.persist();
    }

    pub fn remove(&mut self, id: &str) {
        if !self.is_favorite(id) {
            return;
        }
        debug!("Removing favorite {}", id);
        self.favorites.retain(|m| m.id != id);
        self.persist();
    }

    /// Flip favorite status; returns whether the movie is now a favorite
    pub fn toggle(&mut self, movie: Movie) -> bool {
        if self.is_favorite(&movie.id) {
            self.remove(&movie.id);
            false
        } else {
            self.add(movie);
            true
        }
    }

    /// Replace the in-memory list with what storage holds
    ///
    /// Never fails: unreadable or malformed data yields an empty list, and
    /// individual entries that are not movies are dropped while the rest
    /// are kept in order. A repeated id keeps its first entry.
    pub fn load_from_storage(&mut self) {
        let raw = match self.storage.get(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not read favorites from storage: {}", e);
                None
            }
        };

        self.favorites = raw.as_deref().map(parse_stored_movies).unwrap_or_default();
        debug!("Loaded {} favorites", self.favorites.len());
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.favorites) {
            Ok(s) => s,
            Err(e) => {
                warn!("Could not serialize favorites: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key, &serialized) {
            warn!("Could not persist favorites, keeping them in memory: {}", e);
        }
    }
}

fn parse_stored_movies(raw: &str) -> Vec<Movie> {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Discarding unreadable favorites: {}", e);
            return Vec::new();
        }
    };

    let Value::Array(entries) = parsed else {
        warn!("Discarding favorites: stored value is not a list");
        return Vec::new();
    };

    let total = entries.len();
    let mut seen = HashSet::new();
    let movies: Vec<Movie> = entries
        .into_iter()
        .filter_map(movie_from_value)
        .filter(|movie| seen.insert(movie.id.clone()))
        .collect();
    if movies.len() < total {
        warn!("Dropped {} malformed or duplicate favorites", total - movies.len());
    }
    movies
}

fn movie_from_value(value: Value) -> Option<Movie> {
    let field = |name: &str| value.get(name)?.as_str().map(str::to_string);
    Some(Movie {
        title: field("Title")?,
        year: field("Year")?,
        id: field("imdbID")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviescout_cache::{MemoryStore, StorageError};

    fn alien() -> Movie {
        Movie::new("Alien", "1979", "tt0078748")
    }

    fn aliens() -> Movie {
        Movie::new("Aliens", "1986", "tt0090605")
    }

    /// Counts writes and can be told to fail them
    #[derive(Clone, Default)]
    struct RecordingStore {
        inner: MemoryStore,
        writes: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl RecordingStore {
        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl KeyValueStore for RecordingStore {
        fn get(&self, key: &str) -> moviescout_cache::Result<Option<String>> {
            if self.fail_reads {
                return Err(StorageError::Unavailable("disabled".into()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> moviescout_cache::Result<()> {
            self.writes.lock().unwrap().push(value.to_string());
            if self.fail_writes {
                return Err(StorageError::QuotaExceeded {
                    needed: value.len(),
                    quota: 0,
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> moviescout_cache::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_loads_valid_entries_and_drops_invalid_ones() {
        let storage = MemoryStore::new();
        storage
            .set(
                STORAGE_KEY,
                r#"[{"Title":"Aliens","Year":"1986","imdbID":"tt0090605"},{"wrong":true},null,{"Title":"No id"},{"Title":"Alien","Year":1979,"imdbID":"tt0078748"},{"Title":"Alien","Year":"1979","imdbID":"tt0078748"}]"#,
            )
            .unwrap();

        let store = FavoritesStore::new(storage);

        assert_eq!(store.favorites(), &[aliens(), alien()]);
        assert!(store.ids().contains("tt0090605"));
        assert!(store.ids().contains("tt0078748"));
    }

    #[test]
    fn test_duplicate_ids_keep_first_entry() {
        let storage = MemoryStore::new();
        storage
            .set(
                STORAGE_KEY,
                r#"[{"Title":"First","Year":"2000","imdbID":"x"},{"Title":"Alien","Year":"1979","imdbID":"tt0078748"},{"Title":"Second","Year":"2001","imdbID":"x"}]"#,
            )
            .unwrap();

        let mut store = FavoritesStore::new(storage);

        assert_eq!(store.len(), store.ids().len());
        assert_eq!(
            store.favorites(),
            &[Movie::new("First", "2000", "x"), alien()]
        );

        store.remove("x");
        assert_eq!(store.favorites(), &[alien()]);
    }

    #[test]
    fn test_corrupt_or_wrong_shape_loads_empty() {
        for raw in ["not json", r#"{"Title":"Alien"}"#, "42", "null", ""] {
            let storage = MemoryStore::new();
            storage.set(STORAGE_KEY, raw).unwrap();
            assert!(FavoritesStore::new(storage).is_empty(), "raw = {:?}", raw);
        }

        assert!(FavoritesStore::new(MemoryStore::new()).is_empty());
    }

    #[test]
    fn test_unreadable_storage_loads_empty() {
        let storage = RecordingStore {
            fail_reads: true,
            ..Default::default()
        };
        let mut store = FavoritesStore::new(storage);
        assert!(store.is_empty());

        store.add(alien());
        assert!(store.is_favorite("tt0078748"));
    }

    #[test]
    fn test_add_is_unique_and_persists() {
        let storage = RecordingStore::default();
        let mut store = FavoritesStore::new(storage.clone());

        store.add(alien());
        assert_eq!(store.favorites(), &[alien()]);
        assert_eq!(
            storage.writes(),
            vec![serde_json::to_string(&vec![alien()]).unwrap()]
        );

        store.add(alien());
        assert_eq!(store.len(), 1);
        assert_eq!(storage.writes().len(), 1);

        store.remove("tt0078748");
        assert!(store.is_empty());
        assert_eq!(storage.writes().len(), 2);
        assert_eq!(storage.writes()[1], "[]");

        // Removing something absent doesn't write
        store.remove("tt0078748");
        assert_eq!(storage.writes().len(), 2);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut store = FavoritesStore::new(MemoryStore::new());
        let third = Movie::new("Alien 3", "1992", "tt0103644");

        store.add(aliens());
        store.add(alien());
        store.add(third.clone());
        store.remove("tt0078748");

        assert_eq!(store.favorites(), &[aliens(), third]);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut store = FavoritesStore::new(MemoryStore::new());

        assert!(store.toggle(alien()));
        assert!(store.is_favorite("tt0078748"));

        assert!(!store.toggle(alien()));
        assert!(!store.is_favorite("tt0078748"));
    }

    #[test]
    fn test_no_duplicate_ids_after_mixed_operations() {
        let mut store = FavoritesStore::new(MemoryStore::new());
        let movies = [alien(), aliens(), Movie::new("Alien 3", "1992", "tt0103644")];

        for step in 0..60usize {
            let movie = movies[step * 7 % movies.len()].clone();
            match step % 3 {
                0 => store.add(movie),
                1 => {
                    store.toggle(movie);
                }
                _ => store.remove(&movie.id),
            }
            assert_eq!(store.ids().len(), store.len(), "step {}", step);
        }
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let storage = RecordingStore {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = FavoritesStore::new(storage.clone());

        store.add(alien());
        store.add(aliens());

        assert_eq!(store.len(), 2);
        assert_eq!(storage.writes().len(), 2);
        assert_eq!(storage.inner.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_reload_after_restart() {
        let storage = MemoryStore::new();
        {
            let mut store = FavoritesStore::new(storage.clone());
            store.add(aliens());
        }

        let restored = FavoritesStore::new(storage);
        assert_eq!(restored.favorites(), &[aliens()]);
    }

    #[test]
    fn test_custom_key() {
        let storage = MemoryStore::new();
        let mut store = FavoritesStore::with_key(storage.clone(), "other:favorites");
        store.add(alien());

        assert!(storage.get("other:favorites").unwrap().is_some());
        assert_eq!(storage.get(STORAGE_KEY).unwrap(), None);
    }
}
