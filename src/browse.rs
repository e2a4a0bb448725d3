//! Pagination and search controller for the film list.
//!
//! [`Browser`] owns the query state of the browse screen: current page,
//! search text, accumulated films, the loading flag and the genre table.
//! It performs no I/O. Every user event returns the [`FetchRequest`] (if
//! any) the caller must issue, and every completion is handed back through
//! [`Browser::on_genres_loaded`] or [`Browser::on_films_loaded`], which are
//! the only places state changes in response to the network.
//!
//! # Modes
//!
//! - **Browsing**: query text empty, scrolling to the bottom loads the next
//!   page of the browse-all listing
//! - **Searching**: query text non-empty, no paging; each new text value
//!   restarts the result set
//! - **Loading**: a film fetch is outstanding; scroll-triggered paging is
//!   blocked until it completes (successfully or not)
//!
//! # Query epochs
//!
//! Every reset (search text change, search close, first page after startup)
//! starts a new epoch and bumps [`Browser::generation`]. Requests carry the
//! generation they were issued under; completions from an older epoch are
//! discarded, so a slow response for a superseded query can never be
//! appended to a newer query's results.

use crate::catalogue::{resolve, resolve_all, CatalogueError, Film, Genre, GenreTable};

/// Which listing the accumulated films come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Searching,
}

/// A fetch the caller must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// Fetch the genre table; answer with [`Browser::on_genres_loaded`].
    Genres,
    /// Fetch one page of the browse-all listing.
    Page { generation: u64, page: u32 },
    /// Run a free-text search.
    Search { generation: u64, query: String },
}

impl FetchRequest {
    /// Generation tag for film requests; `None` for genre requests.
    pub fn generation(&self) -> Option<u64> {
        match self {
            FetchRequest::Genres => None,
            FetchRequest::Page { generation, .. } | FetchRequest::Search { generation, .. } => {
                Some(*generation)
            }
        }
    }
}

/// What a film completion did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmsOutcome {
    /// Results were appended.
    Appended { added: usize },
    /// An empty page ended the browse listing for this epoch.
    Exhausted,
    /// The completion belonged to a superseded epoch and was dropped.
    Stale,
    /// The fetch failed; the list is unchanged.
    Failed,
}

/// Query state and transitions for the browse screen.
#[derive(Debug, Default)]
pub struct Browser {
    /// Page of the most recent page request (1-based once started).
    page: u32,
    /// Last page that loaded successfully in this epoch (0 = none).
    loaded_page: u32,
    query: String,
    films: Vec<Film>,
    loading: bool,
    generation: u64,
    exhausted: bool,
    started: bool,
    genres: GenreTable,
    genres_pending: bool,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn films(&self) -> &[Film] {
        &self.films
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> Mode {
        if self.query.is_empty() {
            Mode::Browsing
        } else {
            Mode::Searching
        }
    }

    /// True while a film fetch (or the startup genre fetch) is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once an empty page has been returned in Browsing mode.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn genres(&self) -> &GenreTable {
        &self.genres
    }

    pub fn genres_pending(&self) -> bool {
        self.genres_pending
    }

    // ------------------------------------------------------------------
    // User events
    // ------------------------------------------------------------------

    /// Screen entry: request the genre table. The first page follows once
    /// the genre fetch completes, whether it succeeds or not.
    pub fn start(&mut self) -> FetchRequest {
        self.genres_pending = true;
        self.loading = true;
        tracing::debug!("Browser starting, requesting genres");
        FetchRequest::Genres
    }

    /// Re-request the genre table (e.g. after the startup fetch failed).
    ///
    /// Returns `None` if a genre fetch is already outstanding.
    pub fn reload_genres(&mut self) -> Option<FetchRequest> {
        if self.genres_pending {
            return None;
        }
        self.genres_pending = true;
        Some(FetchRequest::Genres)
    }

    /// The list was scrolled to its last row.
    ///
    /// Only advances in Browsing mode, when no fetch is outstanding and the
    /// listing has not been exhausted.
    pub fn on_scrolled_to_bottom(&mut self) -> Option<FetchRequest> {
        if !self.started || self.loading || self.exhausted || self.mode() == Mode::Searching {
            return None;
        }

        self.page = self.loaded_page + 1;
        self.loading = true;
        tracing::debug!(page = self.page, generation = self.generation, "Loading next page");
        Some(FetchRequest::Page {
            generation: self.generation,
            page: self.page,
        })
    }

    /// The search text changed to `text` (empty text returns to browsing).
    ///
    /// Always resets and refetches; there is no debouncing here.
    pub fn on_search_changed(&mut self, text: &str) -> FetchRequest {
        self.query = text.to_string();
        self.begin_epoch()
    }

    /// The search was closed or cancelled: back to page 1 of browse-all.
    pub fn on_search_closed(&mut self) -> FetchRequest {
        self.query.clear();
        self.begin_epoch()
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Genre fetch completed.
    ///
    /// On success the table is replaced and already accumulated films are
    /// re-resolved. On failure the previous table (empty at startup) is kept
    /// and films keep degrading to empty genre lists. Either way, if no
    /// epoch has started yet, the first browse page is requested.
    pub fn on_genres_loaded(
        &mut self,
        result: Result<Vec<Genre>, CatalogueError>,
    ) -> Option<FetchRequest> {
        self.genres_pending = false;

        match result {
            Ok(genres) => {
                tracing::info!(count = genres.len(), "Genre table loaded");
                self.genres = GenreTable::new(genres);
                resolve_all(&mut self.films, &self.genres);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Genre fetch failed, films will show no genres");
            }
        }

        if self.started {
            None
        } else {
            Some(self.begin_epoch())
        }
    }

    /// Film fetch completed for the epoch tagged `generation`.
    pub fn on_films_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<Film>, CatalogueError>,
    ) -> FilmsOutcome {
        if generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = generation,
                "Ignoring stale film results (generation mismatch)"
            );
            return FilmsOutcome::Stale;
        }

        self.loading = false;

        match result {
            Ok(films) => {
                let mode = self.mode();
                if films.is_empty() && mode == Mode::Browsing {
                    self.exhausted = true;
                    tracing::debug!(page = self.page, "Empty page, browse listing exhausted");
                    return FilmsOutcome::Exhausted;
                }

                let added = films.len();
                self.films
                    .extend(films.into_iter().map(|f| resolve(f, &self.genres)));
                if mode == Mode::Browsing {
                    self.loaded_page = self.page;
                }
                tracing::debug!(
                    page = self.page,
                    added,
                    total = self.films.len(),
                    "Films appended"
                );
                FilmsOutcome::Appended { added }
            }
            Err(e) => {
                // Roll back so the next scroll retries the page that failed
                self.page = self.loaded_page.max(1);
                tracing::warn!(
                    error = %e,
                    page = self.page,
                    query = %self.query,
                    "Film fetch failed"
                );
                FilmsOutcome::Failed
            }
        }
    }

    /// Reset page and films for a new epoch and return its first request.
    fn begin_epoch(&mut self) -> FetchRequest {
        self.started = true;
        self.generation = self.generation.wrapping_add(1);
        self.page = 1;
        self.loaded_page = 0;
        self.films.clear();
        self.exhausted = false;
        self.loading = true;

        if self.query.is_empty() {
            tracing::debug!(generation = self.generation, "Browsing from page 1");
            FetchRequest::Page {
                generation: self.generation,
                page: 1,
            }
        } else {
            tracing::debug!(generation = self.generation, query = %self.query, "Searching");
            FetchRequest::Search {
                generation: self.generation,
                query: self.query.clone(),
            }
        }
    }
}
