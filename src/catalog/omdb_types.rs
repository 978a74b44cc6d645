/// OMDb API response types for deserialization.
///
/// These structures mirror the JSON envelope returned by the OMDb search
/// endpoint. Success and failure share one envelope, told apart by the
/// `Response` flag.
use serde::Deserialize;

/// The top-level response from the OMDb search endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct OmdbSearchEnvelope {
    /// "True" or "False"
    #[serde(rename = "Response")]
    pub response: String,
    /// Error text, present when `response` is "False"
    #[serde(rename = "Error")]
    pub error: Option<String>,
    /// The current page of hits, present when `response` is "True"
    #[serde(rename = "Search")]
    pub search: Option<Vec<OmdbSearchItem>>,
    /// Total hit count across all pages, encoded as a string
    #[serde(rename = "totalResults")]
    pub total_results: Option<String>,
}

impl OmdbSearchEnvelope {
    /// Whether the catalog flagged this response as successful.
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

/// A single hit inside the `Search` array.
#[derive(Debug, Deserialize)]
pub(super) struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
}
