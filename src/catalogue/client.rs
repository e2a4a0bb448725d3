use super::types::{Film, FilmDetailResponse, FilmPageResponse, Genre, GenreListResponse};
use crate::util::{read_limited_bytes, validate_base_url, ResponseTooLarge, UrlValidationError};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Default catalogue API root (TMDB v3).
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Errors returned by catalogue requests.
///
/// Fetch errors are reported to the caller; the browsing layer logs them and
/// keeps its last good state.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// Transport failure (DNS, connect, TLS, client timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response other than a film lookup miss
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Body did not match the expected schema
    #[error("Malformed response: {0}")]
    Decode(String),
    /// `fetch_film` for an id the catalogue does not know
    #[error("Film {0} not found")]
    NotFound(u64),
    /// Page numbers are 1-based
    #[error("Invalid page number: {0}")]
    InvalidPage(u32),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error(transparent)]
    InvalidBaseUrl(#[from] UrlValidationError),
}

impl From<ResponseTooLarge> for CatalogueError {
    fn from(e: ResponseTooLarge) -> Self {
        CatalogueError::ResponseTooLarge(e.0)
    }
}

/// HTTP client for the movie catalogue API.
///
/// Constructed explicitly and passed to whoever needs it; cloning is cheap
/// (the underlying `reqwest::Client` and API key are shared).
#[derive(Clone)]
pub struct CatalogueClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Arc<SecretString>,
    language: String,
}

impl std::fmt::Debug for CatalogueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogueClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("language", &self.language)
            .finish()
    }
}

impl CatalogueClient {
    /// Create a client against `base_url`.
    ///
    /// # Errors
    ///
    /// [`CatalogueError::InvalidBaseUrl`] if the URL is unparseable or uses
    /// plain HTTP for a non-local host (the API key travels in the query).
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: SecretString,
        language: impl Into<String>,
    ) -> Result<Self, CatalogueError> {
        let base_url = validate_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key: Arc::new(api_key),
            language: language.into(),
        })
    }

    /// Fetch the full genre table.
    pub async fn fetch_genres(&self) -> Result<Vec<Genre>, CatalogueError> {
        let body: GenreListResponse = self.get_json("/genre/movie/list", &[]).await?;
        tracing::debug!(count = body.genres.len(), "Fetched genre table");
        Ok(body.genres)
    }

    /// Fetch one page of the browse-all listing. Pages are 1-based.
    ///
    /// Page size is whatever the upstream returns; an empty `Vec` means the
    /// listing has been exhausted.
    pub async fn fetch_films(&self, page: u32) -> Result<Vec<Film>, CatalogueError> {
        if page == 0 {
            return Err(CatalogueError::InvalidPage(page));
        }
        let page_str = page.to_string();
        let body: FilmPageResponse = self
            .get_json("/discover/movie", &[("page", page_str.as_str())])
            .await?;
        tracing::debug!(
            page,
            upstream_page = ?body.page,
            count = body.results.len(),
            "Fetched film page"
        );
        Ok(body.results.into_iter().map(Film::from).collect())
    }

    /// Free-text search. Not paginated: returns the upstream's first result
    /// set for `query`.
    pub async fn search_films(&self, query: &str) -> Result<Vec<Film>, CatalogueError> {
        let body: FilmPageResponse = self.get_json("/search/movie", &[("query", query)]).await?;
        tracing::debug!(query = %query, count = body.results.len(), "Search returned");
        Ok(body.results.into_iter().map(Film::from).collect())
    }

    /// Fetch a single film by id, with genres already resolved.
    ///
    /// # Errors
    ///
    /// [`CatalogueError::NotFound`] when the catalogue answers 404.
    pub async fn fetch_film(&self, id: u64) -> Result<Film, CatalogueError> {
        let path = format!("/movie/{}", id);
        match self.get_json::<FilmDetailResponse>(&path, &[]).await {
            Ok(body) => Ok(Film::from(body)),
            Err(CatalogueError::HttpStatus(404)) => Err(CatalogueError::NotFound(id)),
            Err(e) => Err(e),
        }
    }

    /// Public web page for a film, for opening in a browser.
    pub fn film_page_url(id: u64) -> String {
        format!("https://www.themoviedb.org/movie/{}", id)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CatalogueError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.api_key.expose_secret()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::debug!(path = %path, status, "Catalogue request failed");
            return Err(CatalogueError::HttpStatus(status));
        }

        let bytes = read_limited_bytes::<CatalogueError>(response, MAX_RESPONSE_SIZE).await?;
        serde_json::from_slice(&bytes).map_err(|e| CatalogueError::Decode(e.to_string()))
    }
}
