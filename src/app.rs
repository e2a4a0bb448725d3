use crate::browse::Browser;
use crate::catalogue::{CatalogueClient, CatalogueError, Film, Genre};
use crate::config::Config;
use crate::store::{Comment, Favorite, LikedFilm, LikedFilms, RealtimeStore, StoreError};
use anyhow::{Context, Result};
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// Shared HTTP client for catalogue and store requests.
///
/// The request timeout lives here; the browsing core enforces none itself.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

// ============================================================================
// View Enum
// ============================================================================

/// Current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browse,    // Catalogue list + detail pane
    Favorites, // The user's liked films
    Comments,  // Comments on one film
}

// ============================================================================
// Events
// ============================================================================

/// Events from background tasks.
///
/// Every network completion comes back through this channel and is applied
/// in the event loop, which is the only place app state is mutated.
pub enum AppEvent {
    GenresLoaded(Result<Vec<Genre>, CatalogueError>),
    /// Films for the query epoch tagged `generation`.
    FilmsLoaded {
        generation: u64,
        result: Result<Vec<Film>, CatalogueError>,
    },
    FavoritesLoaded(Result<LikedFilms, StoreError>),
    /// The user's favorite records, without film lookups.
    FavoriteKeysLoaded(Result<Vec<Favorite>, StoreError>),
    FavoriteAdded {
        film_id: u64,
        title: String,
        result: Result<String, StoreError>,
    },
    FavoriteRemoved {
        film_id: u64,
        title: String,
        result: Result<(), StoreError>,
    },
    CommentsLoaded {
        film_id: u64,
        result: Result<Vec<Comment>, StoreError>,
    },
    /// A background task panicked. Film tasks carry the generation they
    /// were issued under.
    TaskPanicked {
        task: &'static str,
        generation: Option<u64>,
        error: String,
    },
}

// ============================================================================
// App State
// ============================================================================

pub struct App {
    pub catalogue: CatalogueClient,
    /// None when no realtime database is configured.
    pub store: Option<RealtimeStore>,
    /// Identity for favorites; None disables favorites.
    pub user_email: Option<String>,

    pub view: View,
    pub browser: Browser,
    pub selected_film: usize,

    pub search_mode: bool,
    pub search_input: String,

    pub liked: Vec<LikedFilm>,
    pub selected_liked: usize,
    pub liked_loading: bool,
    /// Film id → store key of the user's favorite record.
    pub favorite_keys: HashMap<u64, String>,
    /// Whether `favorite_keys` reflects the store yet. Toggling waits for it.
    pub favorite_keys_loaded: bool,
    /// Film ids with an add/remove request in flight.
    pub favorite_pending: Vec<u64>,

    /// Film (id, title) whose comments are shown.
    pub comments_for: Option<(u64, String)>,
    pub comments: Vec<Comment>,
    pub comments_loading: bool,
    pub comments_scroll: usize,
    /// View to return to when leaving comments.
    pub comments_return: View,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    /// Loading spinner frame, advanced by the tick handler.
    pub spinner_frame: usize,
}

impl App {
    /// Build app state from configuration.
    ///
    /// `email_override` (from the command line) wins over `user_email` in
    /// the config file.
    pub fn new(config: &Config, email_override: Option<String>) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(config.request_timeout_secs.max(1)))?;

        let api_key = config.api_key().context(
            "No catalogue API key: set TMDB_API_KEY or tmdb_api_key in config.toml",
        )?;
        let catalogue = CatalogueClient::new(
            http.clone(),
            &config.tmdb_base_url,
            api_key,
            config.language.clone(),
        )
        .context("Invalid tmdb_base_url")?;

        let store = match &config.firebase_database_url {
            Some(url) => Some(
                RealtimeStore::new(http, url, config.auth_token())
                    .context("Invalid firebase_database_url")?,
            ),
            None => None,
        };

        let user_email = email_override
            .or_else(|| config.user_email.clone())
            .filter(|e| !e.trim().is_empty());

        Ok(Self::with_clients(catalogue, store, user_email))
    }

    /// Build app state around already constructed clients.
    pub fn with_clients(
        catalogue: CatalogueClient,
        store: Option<RealtimeStore>,
        user_email: Option<String>,
    ) -> Self {
        Self {
            catalogue,
            store,
            user_email,
            view: View::Browse,
            browser: Browser::new(),
            selected_film: 0,
            search_mode: false,
            search_input: String::new(),
            liked: Vec::new(),
            selected_liked: 0,
            liked_loading: false,
            favorite_keys: HashMap::new(),
            favorite_keys_loaded: false,
            favorite_pending: Vec::new(),
            comments_for: None,
            comments: Vec::new(),
            comments_loading: false,
            comments_scroll: 0,
            comments_return: View::Browse,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    /// Store and identity, when favorites are usable.
    pub fn favorites_backend(&self) -> Option<(RealtimeStore, String)> {
        match (&self.store, &self.user_email) {
            (Some(store), Some(email)) => Some((store.clone(), email.clone())),
            _ => None,
        }
    }

    pub fn is_favorite(&self, film_id: u64) -> bool {
        self.favorite_keys.contains_key(&film_id)
    }

    /// The film under the cursor in the current view.
    pub fn selected_film(&self) -> Option<&Film> {
        match self.view {
            View::Browse => self.browser.films().get(self.selected_film),
            View::Favorites => self.liked.get(self.selected_liked).map(|l| &l.film),
            View::Comments => None,
        }
    }

    /// Replace the liked list and rebuild the favorite key index.
    pub fn set_liked(&mut self, liked: Vec<LikedFilm>) {
        self.favorite_keys = liked
            .iter()
            .map(|l| (l.film.id, l.favorite.key.clone()))
            .collect();
        self.favorite_keys_loaded = true;
        self.liked = liked;
        self.clamp_selections();
    }

    /// Ensure selection indices stay within list bounds.
    pub fn clamp_selections(&mut self) {
        let films = self.browser.films().len();
        self.selected_film = self.selected_film.min(films.saturating_sub(1));
        self.selected_liked = self.selected_liked.min(self.liked.len().saturating_sub(1));
    }

    pub fn nav_up(&mut self) {
        match self.view {
            View::Browse => self.selected_film = self.selected_film.saturating_sub(1),
            View::Favorites => self.selected_liked = self.selected_liked.saturating_sub(1),
            View::Comments => self.comments_scroll = self.comments_scroll.saturating_sub(1),
        }
    }

    /// Move the cursor down.
    ///
    /// Returns true when the browse list cursor is on its last row, which is
    /// the scrolled-to-bottom trigger for paging. An empty list counts as
    /// being at its bottom, so a failed first page can be requested again.
    pub fn nav_down(&mut self) -> bool {
        match self.view {
            View::Browse => {
                let len = self.browser.films().len();
                if len == 0 {
                    return true;
                }
                self.selected_film = self.selected_film.saturating_add(1).min(len - 1);
                self.selected_film == len - 1
            }
            View::Favorites => {
                if !self.liked.is_empty() {
                    self.selected_liked =
                        self.selected_liked.saturating_add(1).min(self.liked.len() - 1);
                }
                false
            }
            View::Comments => {
                if self.comments_scroll + 1 < self.comments.len() {
                    self.comments_scroll += 1;
                }
                false
            }
        }
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it has expired.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Open the comments view for a film, remembering where we came from.
    pub fn enter_comments(&mut self, film_id: u64, title: String) {
        self.comments_return = self.view;
        self.comments_for = Some((film_id, title));
        self.comments.clear();
        self.comments_scroll = 0;
        self.comments_loading = true;
        self.view = View::Comments;
    }

    pub fn exit_comments(&mut self) {
        self.view = self.comments_return;
        self.comments_for = None;
        self.comments.clear();
        self.comments_loading = false;
    }

    /// Whether any spinner-worthy work is outstanding.
    pub fn is_busy(&self) -> bool {
        self.browser.is_loading() || self.liked_loading || self.comments_loading
    }
}
