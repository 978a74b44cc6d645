//! MovieShelf - Search a movie catalog and keep a shelf of favorites
//!
//! This library provides the state behind a movie search front end: paged
//! catalog queries reconciled into a single search session, a persisted and
//! deduplicated favorites collection, and a persisted light/dark preference.
//! Rendering is left to the caller, which reads the state exposed here and
//! mutates it only through [`MovieShelf`].

mod catalog;
mod favorites;
mod preference;
mod session;
mod store;

pub use catalog::{
    CatalogClient, CatalogConfig, CatalogError, DEFAULT_BASE_URL, MediaType, MovieSummary,
    OmdbClient, PAGE_SIZE, POSTER_UNAVAILABLE, PageResponse, page_count,
};
pub use favorites::FavoritesRegistry;
pub use preference::{DisplayPreference, PreferenceState, platform_default_from_colorfgbg};
pub use session::{
    NETWORK_ERROR_MESSAGE, PageRequest, SearchController, SearchSession, SessionStatus,
};
pub use store::{
    FAVORITES_KEY, FileStore, KeyValueStore, MemoryStore, PREFERENCE_KEY, StoreAdapter,
    StoreError,
};

use thiserror::Error;

/// Top-level error type for MovieShelf setup
///
/// Runtime operations never fail: catalog errors end up in the session and
/// persistence errors are logged. Only building the pieces can go wrong.
#[derive(Debug, Error)]
pub enum MovieShelfError {
    /// Error while setting up the catalog client
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error while opening the persistent store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// The search, favorites and preference state of one user.
///
/// All components are handed in explicitly; the two persisted components
/// share the given key-value store.
///
/// # Examples
///
/// ```no_run
/// use movie_shelf::{CatalogConfig, FileStore, MovieShelf, OmdbClient};
///
/// let client = OmdbClient::new(CatalogConfig::new("my-api-key")).unwrap();
/// let store = FileStore::open().unwrap();
/// let mut shelf = MovieShelf::new(client, store, None);
///
/// shelf.search("batman");
/// if let Some(first) = shelf.session().results().first().cloned() {
///     shelf.add_favorite(first);
/// }
/// shelf.next_page();
/// ```
pub struct MovieShelf<C, S> {
    client: C,
    search: SearchController,
    favorites: FavoritesRegistry<S>,
    preference: PreferenceState<S>,
}

impl<C, S> MovieShelf<C, S>
where
    C: CatalogClient,
    S: KeyValueStore + Clone,
{
    /// Builds the shelf, loading favorites and the display preference from
    /// `store`.
    ///
    /// `platform_default` is used for the preference when none is stored.
    pub fn new(client: C, store: S, platform_default: Option<DisplayPreference>) -> Self {
        let favorites = FavoritesRegistry::load(StoreAdapter::new(store.clone()));
        let preference = PreferenceState::load(StoreAdapter::new(store), platform_default);

        Self {
            client,
            search: SearchController::new(),
            favorites,
            preference,
        }
    }
}

impl<C, S> MovieShelf<C, S>
where
    C: CatalogClient,
    S: KeyValueStore,
{
    pub fn session(&self) -> &SearchSession {
        self.search.session()
    }

    pub fn favorites(&self) -> &[MovieSummary] {
        self.favorites.items()
    }

    pub fn preference(&self) -> DisplayPreference {
        self.preference.current()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// Searches the catalog for `term`, showing page 1. Blank terms are ignored.
    pub fn search(&mut self, term: &str) -> bool {
        self.search.search(&self.client, term)
    }

    /// Shows another page of the current term. Out-of-range pages are ignored.
    pub fn change_page(&mut self, page: u32) -> bool {
        self.search.change_page(&self.client, page)
    }

    pub fn next_page(&mut self) -> bool {
        self.search.next_page(&self.client)
    }

    pub fn previous_page(&mut self) -> bool {
        self.search.previous_page(&self.client)
    }

    pub fn add_favorite(&mut self, movie: MovieSummary) -> bool {
        self.favorites.add(movie)
    }

    pub fn remove_favorite(&mut self, id: &str) -> bool {
        self.favorites.remove(id)
    }

    /// Returns whether the title is a favorite afterwards.
    pub fn toggle_favorite(&mut self, movie: &MovieSummary) -> bool {
        self.favorites.toggle(movie)
    }

    pub fn toggle_preference(&mut self) -> DisplayPreference {
        self.preference.toggle()
    }
}
