//! Movie catalog search

pub mod tmdb;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::error::ErrorKind;

pub use tmdb::TmdbClient;

/// One movie from a catalog search, already formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSummary {
    pub title: String,
    /// Release year or `N/A`
    pub year: String,
    /// Average vote with one decimal or `N/A`
    pub rating: String,
    pub overview: String,
    pub poster_url: Option<String>,
}

/// Catalog failures
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("TMDB_API_KEY is not configured")]
    ApiKeyMissing,

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned status {0}")]
    Status(reqwest::StatusCode),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::ApiKeyMissing => ErrorKind::ApiKeyMissing,
            _ => ErrorKind::Generic,
        }
    }
}

/// Searches a movie catalog by free-text title.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Returns the top results in catalog relevance order. An empty query yields no results.
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError>;
}
