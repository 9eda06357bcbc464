//! TMDB search client with a per-query response cache

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;

use super::{CatalogError, MovieCatalog, MovieSummary};
use crate::core::config::{self, TmdbConfig};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    #[serde(default)]
    title: String,
    release_date: Option<String>,
    vote_average: Option<f64>,
    overview: Option<String>,
    poster_path: Option<String>,
}

impl From<TmdbMovie> for MovieSummary {
    fn from(movie: TmdbMovie) -> Self {
        let year = movie
            .release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .map(str::to_string)
            .unwrap_or_else(|| "N/A".to_string());
        let rating = movie
            .vote_average
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "N/A".to_string());
        let poster_url = movie
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", config::tmdb::POSTER_BASE_URL, p));

        MovieSummary {
            title: movie.title,
            year,
            rating,
            overview: movie.overview.unwrap_or_default(),
            poster_url,
        }
    }
}

/// TMDB `/search/movie` adapter
///
/// Results are cached for the store TTL under the trimmed, lower-cased query.
pub struct TmdbClient {
    http: reqwest::Client,
    config: TmdbConfig,
    cache: Cache<String, Vec<MovieSummary>>,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder().timeout(config::tmdb::timeout()).build()?;
        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(config::stores::ttl())
            .build();
        Ok(Self { http, config, cache })
    }

    async fn fetch(&self, api_key: &str, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let url = format!("{}/search/movie", self.config.base_url.trim_end_matches('/'));

        let mut params: Vec<(&str, &str)> = vec![
            ("api_key", api_key),
            ("query", query),
            ("include_adult", "false"),
            ("language", self.config.language.as_str()),
        ];
        if let Some(region) = self.config.region.as_deref() {
            params.push(("region", region));
        }

        let response = self.http.get(&url).query(&params).send().await?;
        if !response.status().is_success() {
            log::warn!("TMDB search for {:?} failed with status {}", query, response.status());
            return Err(CatalogError::Status(response.status()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .take(config::tmdb::MAX_RESULTS)
            .map(MovieSummary::from)
            .collect())
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let cleaned = query.trim();
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self.config.api_key.as_deref().ok_or(CatalogError::ApiKeyMissing)?;

        let cache_key = cleaned.to_lowercase();
        if let Some(items) = self.cache.get(&cache_key).await {
            log::debug!("TMDB cache hit for {:?}", cache_key);
            return Ok(items);
        }

        let items = self.fetch(api_key, cleaned).await?;
        log::info!("TMDB search {:?} returned {} result(s)", cleaned, items.len());
        self.cache.insert(cache_key, items.clone()).await;
        Ok(items)
    }
}
