//! Movie catalog querying
//!
//! This module provides the structures describing catalog search results
//! and the trait for clients able to fetch a single page of them.

mod omdb;
mod omdb_types;

pub use omdb::{CatalogConfig, DEFAULT_BASE_URL, OmdbClient};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of items the upstream catalog returns per result page.
pub const PAGE_SIZE: u32 = 10;

/// Poster value the catalog uses when no artwork exists.
pub const POSTER_UNAVAILABLE: &str = "N/A";

/// Errors that can occur while fetching a page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog reported no matches or an API level error
    #[error("{0}")]
    NoResults(String),

    /// Transport failure or a response body that could not be understood
    #[error("Network failure: {0}")]
    Network(String),
}

/// Kind of title a catalog entry describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    Movie,
    Series,
    Episode,
    Game,
    /// Any type the catalog may add later
    Other(String),
}

impl From<String> for MediaType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "movie" => MediaType::Movie,
            "series" => MediaType::Series,
            "episode" => MediaType::Episode,
            "game" => MediaType::Game,
            _ => MediaType::Other(value),
        }
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => f.write_str("movie"),
            MediaType::Series => f.write_str("series"),
            MediaType::Episode => f.write_str("episode"),
            MediaType::Game => f.write_str("game"),
            MediaType::Other(other) => f.write_str(other),
        }
    }
}

/// A single search hit as returned by the catalog.
///
/// Field names on the wire follow the catalog's own spelling, so a persisted
/// favorites collection keeps the exact shape the catalog handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Catalog identifier, unique per title, year and type
    #[serde(rename = "imdbID")]
    pub id: String,
    /// The display title
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year, or a range such as "2005–2013" for series
    #[serde(rename = "Year")]
    pub year: String,
    /// Poster URL, or [`POSTER_UNAVAILABLE`]
    #[serde(rename = "Poster")]
    pub poster_url: String,
    /// Media type, when the catalog provided one
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
}

impl MovieSummary {
    /// Returns the poster URL, or `None` when the catalog has no artwork.
    pub fn poster(&self) -> Option<&str> {
        let url = self.poster_url.trim();
        if url.is_empty() || url == POSTER_UNAVAILABLE {
            None
        } else {
            Some(url)
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// The items on this page, in catalog order
    pub items: Vec<MovieSummary>,
    /// Total number of matches across all pages
    pub total_results: u32,
}

/// Number of pages needed to show `total_results` items.
pub fn page_count(total_results: u32) -> u32 {
    total_results.div_ceil(PAGE_SIZE)
}

/// Trait for clients that can fetch search results from a movie catalog.
///
/// The search session only talks to the catalog through this trait, which
/// keeps the session logic independent of the transport in use.
pub trait CatalogClient {
    /// Fetches a single page of results for a search term.
    ///
    /// # Arguments
    ///
    /// * `term` - The non-empty search term
    /// * `page` - The 1-based page number
    ///
    /// # Returns
    ///
    /// A Result containing the PageResponse, or a CatalogError
    fn fetch_page(&self, term: &str, page: u32) -> Result<PageResponse, CatalogError>;
}

impl<C: CatalogClient + ?Sized> CatalogClient for &C {
    fn fetch_page(&self, term: &str, page: u32) -> Result<PageResponse, CatalogError> {
        (**self).fetch_page(term, page)
    }
}
