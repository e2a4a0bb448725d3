//! Application event handling.
//!
//! Applies background task completions to app state. Film and genre
//! completions go through the browser, which decides whether they are
//! still current; favorites and comments are checked here against what
//! the user is looking at.

use crate::app::{App, AppEvent, View};
use crate::browse::FilmsOutcome;
use crate::catalogue::{CatalogueError, Film};
use tokio::sync::mpsc;

use super::helpers::dispatch;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::GenresLoaded(result) => {
            let failed = result.is_err();
            if let Some(request) = app.browser.on_genres_loaded(result) {
                dispatch(&app.catalogue, request, event_tx);
            }
            if failed {
                app.set_status("Could not load genres ([g] to retry)");
            }
        }
        AppEvent::FilmsLoaded { generation, result } => {
            handle_films_loaded(app, generation, result);
        }
        AppEvent::FavoritesLoaded(result) => {
            app.liked_loading = false;
            match result {
                Ok(liked) => {
                    if liked.failed > 0 {
                        app.set_status(format!(
                            "{} favorite(s) could not be loaded",
                            liked.failed
                        ));
                    }
                    app.set_liked(liked.films);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load favorites");
                    app.set_status(format!("Failed to load favorites: {}", e));
                }
            }
        }
        AppEvent::FavoriteKeysLoaded(result) => match result {
            Ok(favorites) => {
                tracing::debug!(count = favorites.len(), "Favorite keys loaded");
                // Keys from toggles already in flight or applied stay as they are
                for favorite in favorites {
                    if app.favorite_pending.contains(&favorite.film_id) {
                        continue;
                    }
                    app.favorite_keys
                        .entry(favorite.film_id)
                        .or_insert(favorite.key);
                }
                app.favorite_keys_loaded = true;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load favorite keys");
                app.set_status(format!("Failed to load favorites: {} ([F] to retry)", e));
            }
        },
        AppEvent::FavoriteAdded {
            film_id,
            title,
            result,
        } => {
            app.favorite_pending.retain(|id| *id != film_id);
            match result {
                Ok(key) => {
                    tracing::debug!(film_id, key = %key, "Favorite add applied");
                    app.favorite_keys.insert(film_id, key);
                    app.set_status(format!("Added to favorites: {}", title));
                }
                Err(e) => {
                    tracing::error!(film_id, error = %e, "Failed to add favorite");
                    app.set_status(format!("Failed to add favorite: {}", e));
                }
            }
        }
        AppEvent::FavoriteRemoved {
            film_id,
            title,
            result,
        } => {
            app.favorite_pending.retain(|id| *id != film_id);
            match result {
                Ok(()) => {
                    tracing::debug!(film_id, "Favorite removal applied");
                    app.favorite_keys.remove(&film_id);
                    app.liked.retain(|l| l.film.id != film_id);
                    app.clamp_selections();
                    app.set_status(format!("Removed from favorites: {}", title));
                }
                Err(e) => {
                    tracing::error!(film_id, error = %e, "Failed to remove favorite");
                    app.set_status(format!("Failed to remove favorite: {}", e));
                }
            }
        }
        AppEvent::CommentsLoaded { film_id, result } => {
            // Ignore comments for a film the user has already left
            let current = app.comments_for.as_ref().map(|(id, _)| *id);
            if app.view != View::Comments || current != Some(film_id) {
                tracing::debug!(film_id, "Ignoring stale comments");
                return;
            }
            app.comments_loading = false;
            match result {
                Ok(comments) => {
                    tracing::debug!(film_id, count = comments.len(), "Comments loaded");
                    app.comments = comments;
                    app.comments_scroll = 0;
                }
                Err(e) => {
                    tracing::error!(film_id, error = %e, "Failed to load comments");
                    app.set_status(format!("Failed to load comments: {}", e));
                }
            }
        }
        AppEvent::TaskPanicked {
            task,
            generation,
            error,
        } => {
            tracing::error!(task, ?generation, error = %error, "Task panicked");
            match task {
                // Settle the browser as if the fetch had failed
                "genres" => {
                    let err = CatalogueError::Decode(format!("task panicked: {}", error));
                    if let Some(request) = app.browser.on_genres_loaded(Err(err)) {
                        dispatch(&app.catalogue, request, event_tx);
                    }
                }
                "films" | "search" => {
                    // A panic from a superseded query comes back as stale
                    if let Some(generation) = generation {
                        let err = CatalogueError::Decode(format!("task panicked: {}", error));
                        app.browser.on_films_loaded(generation, Err(err));
                    }
                }
                "favorites" => app.liked_loading = false,
                "comments" => app.comments_loading = false,
                _ => {}
            }
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}

fn handle_films_loaded(
    app: &mut App,
    generation: u64,
    result: Result<Vec<Film>, CatalogueError>,
) {
    let error = result.as_ref().err().map(|e| e.to_string());
    match app.browser.on_films_loaded(generation, result) {
        FilmsOutcome::Appended { .. } | FilmsOutcome::Exhausted => {
            app.clamp_selections();
        }
        FilmsOutcome::Stale => {}
        FilmsOutcome::Failed => {
            let msg = error.unwrap_or_default();
            app.set_status(format!("Failed to load films: {}", msg));
        }
    }
}
