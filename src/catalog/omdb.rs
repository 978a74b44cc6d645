/// OMDb catalog client implementation.
use super::omdb_types::{OmdbSearchEnvelope, OmdbSearchItem};
use super::{CatalogClient, CatalogError, MediaType, MovieSummary, PageResponse};
use reqwest::StatusCode;
use std::time::Duration;

/// Base URL of the public OMDb API.
pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com";

/// Message used when the catalog fails without giving a reason.
const NO_RESULTS_FALLBACK: &str = "No results found.";

/// Connection settings for the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base URL of the search endpoint
    pub base_url: String,
    /// Process-wide API credential sent with every request
    pub api_key: String,
    /// Optional transport timeout per request
    pub timeout: Option<Duration>,
}

impl CatalogConfig {
    /// Creates a configuration for the public OMDb endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: None,
        }
    }
}

/// Catalog client for the OMDb API.
///
/// This client queries the `s` (search) endpoint one page at a time. OMDb
/// reports most failures inside a normal JSON body rather than through the
/// HTTP status, so the `Response` flag of the body is what decides between
/// results and an error.
pub struct OmdbClient {
    client: reqwest::blocking::Client,
    config: CatalogConfig,
}

impl OmdbClient {
    /// Creates a new OMDb client from the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Converts an OMDb search hit to our MovieSummary structure.
    ///
    /// Hits without an identifier cannot be told apart from each other and
    /// are skipped.
    fn convert_item(item: OmdbSearchItem) -> Option<MovieSummary> {
        let id = item.imdb_id.filter(|id| !id.trim().is_empty())?;

        Some(MovieSummary {
            id,
            title: item.title.unwrap_or_else(|| "Unknown".to_string()),
            year: item.year.unwrap_or_default(),
            poster_url: item
                .poster
                .unwrap_or_else(|| super::POSTER_UNAVAILABLE.to_string()),
            media_type: item.kind.filter(|k| !k.is_empty()).map(MediaType::from),
        })
    }

    /// Converts a decoded envelope into a page or a catalog error.
    fn convert_envelope(envelope: OmdbSearchEnvelope) -> Result<PageResponse, CatalogError> {
        if !envelope.is_success() {
            let message = envelope
                .error
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| NO_RESULTS_FALLBACK.to_string());
            return Err(CatalogError::NoResults(message));
        }

        let total_results = envelope
            .total_results
            .ok_or_else(|| CatalogError::Network("Response is missing totalResults".to_string()))?
            .trim()
            .parse::<u32>()
            .map_err(|e| CatalogError::Network(format!("Invalid totalResults: {}", e)))?;

        let items = envelope
            .search
            .ok_or_else(|| CatalogError::Network("Response is missing Search".to_string()))?
            .into_iter()
            .filter_map(Self::convert_item)
            .collect();

        Ok(PageResponse {
            items,
            total_results,
        })
    }

    /// Interprets a raw response body.
    ///
    /// A failure envelope wins over the HTTP status: OMDb answers an invalid
    /// key with 401 and `{"Response":"False","Error":"Invalid API key!"}`.
    fn parse_page(status: StatusCode, body: &str) -> Result<PageResponse, CatalogError> {
        match serde_json::from_str::<OmdbSearchEnvelope>(body) {
            Ok(envelope) => Self::convert_envelope(envelope),
            Err(_) if !status.is_success() => Err(CatalogError::Network(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ))),
            Err(e) => Err(CatalogError::Network(format!(
                "Failed to parse API response: {}",
                e
            ))),
        }
    }
}

impl CatalogClient for OmdbClient {
    fn fetch_page(&self, term: &str, page: u32) -> Result<PageResponse, CatalogError> {
        let term = term.trim();
        if term.is_empty() || page == 0 {
            return Err(CatalogError::NoResults(NO_RESULTS_FALLBACK.to_string()));
        }

        // Build the API URL
        let url = format!("{}/", self.config.base_url.trim_end_matches('/'));
        let page_param = page.to_string();

        tracing::debug!(term, page, "requesting catalog page");

        // Make the HTTP request with query parameters
        let response = self
            .client
            .get(&url)
            .query(&[
                ("apikey", self.config.api_key.as_str()),
                ("s", term),
                ("page", page_param.as_str()),
            ])
            .send()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let result = Self::parse_page(status, &body);
        match &result {
            Ok(page_response) => tracing::debug!(
                term,
                page,
                items = page_response.items.len(),
                total_results = page_response.total_results,
                "catalog page received"
            ),
            Err(e) => tracing::debug!(term, page, error = %e, "catalog request failed"),
        }
        result
    }
}
