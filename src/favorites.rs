//! Favorites registry
//!
//! Keeps the user's favorite titles as an ordered, duplicate-free collection
//! and persists it after every change.

use crate::catalog::MovieSummary;
use crate::store::{KeyValueStore, StoreAdapter};
use std::collections::HashSet;

/// The deduplicated favorites collection.
///
/// Membership is decided by catalog id only. Titles keep the position they
/// were first added at; re-adding an existing title does not move it.
#[derive(Debug)]
pub struct FavoritesRegistry<S> {
    items: Vec<MovieSummary>,
    store: StoreAdapter<S>,
}

impl<S> FavoritesRegistry<S>
where
    S: KeyValueStore,
{
    /// Creates the registry from whatever the store holds.
    ///
    /// A stored collection containing the same id twice keeps only the first
    /// occurrence.
    pub fn load(store: StoreAdapter<S>) -> Self {
        let mut seen = HashSet::new();
        let items: Vec<MovieSummary> = store
            .read_favorites()
            .into_iter()
            .filter(|movie| seen.insert(movie.id.clone()))
            .collect();

        tracing::debug!(count = items.len(), "favorites loaded");

        Self { items, store }
    }

    /// Adds a title to the end of the collection.
    ///
    /// Returns `false` if a title with the same id is already present, in
    /// which case nothing changes.
    pub fn add(&mut self, movie: MovieSummary) -> bool {
        if self.contains(&movie.id) {
            return false;
        }

        tracing::debug!(id = %movie.id, title = %movie.title, "adding favorite");
        self.items.push(movie);
        self.persist();
        true
    }

    /// Removes the title with the given id, returning whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(position) = self.items.iter().position(|movie| movie.id == id) else {
            return false;
        };

        tracing::debug!(id, "removing favorite");
        self.items.remove(position);
        self.persist();
        true
    }

    /// Adds the title if absent, removes it otherwise.
    ///
    /// Returns whether the title is a favorite afterwards.
    pub fn toggle(&mut self, movie: &MovieSummary) -> bool {
        if self.remove(&movie.id) {
            false
        } else {
            self.add(movie.clone())
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|movie| movie.id == id)
    }

    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Writes the collection to the store. The in-memory collection stays
    /// authoritative if the write fails.
    fn persist(&self) {
        if let Err(e) = self.store.write_favorites(&self.items) {
            tracing::warn!(error = %e, count = self.items.len(), "failed to persist favorites");
        }
    }
}
