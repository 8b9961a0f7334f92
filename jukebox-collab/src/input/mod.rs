use async_trait::async_trait;
use thiserror::Error;

mod youtube;

pub use youtube::*;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input did not match")]
    NoMatch,

    #[error("Failed to fetch resource: {0}")]
    FetchError(String),

    #[error("Failed to parse resource: {0}")]
    ParseError(String),

    #[error("{0}")]
    Other(String),
}

/// A candidate track returned by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    /// Opaque identifier of the track, becomes the link of a playlist item
    pub id: String,
    /// The length as `[hh:]mm:ss`, or an empty string if unknown
    pub length_text: String,
}

/// Turns free text queries into candidate tracks.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Returns the candidates matching the query, best match first.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, InputError>;
}
