//! Helper functions for UI operations.
//!
//! Background task spawning lives here: every network call the UI makes
//! runs on its own task and reports back through an `AppEvent`.

use crate::app::{App, AppEvent};
use crate::browse::FetchRequest;
use crate::catalogue::CatalogueClient;
use crate::store::{favorites_for, load_liked_films, RealtimeStore};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Spawned tasks that panic would otherwise vanish silently inside the
/// runtime; this turns the panic into `Err(message)` so the task can report
/// it as `AppEvent::TaskPanicked`.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Send an event, logging if the event loop has gone away.
async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}

/// Spawn `work` with panic capture; `task` names it in the panic report.
///
/// Film fetches pass their query generation so a panic can be settled
/// against the epoch that issued it.
fn spawn_reporting<F>(
    task: &'static str,
    generation: Option<u64>,
    tx: mpsc::Sender<AppEvent>,
    work: F,
) where
    F: std::future::Future<Output = AppEvent> + Send + 'static,
{
    tokio::spawn(async move {
        match catch_task_panic(work).await {
            Ok(event) => send_event(&tx, event, task).await,
            Err(panic_msg) => {
                tracing::error!(task, ?generation, error = %panic_msg, "Background task panicked");
                send_event(
                    &tx,
                    AppEvent::TaskPanicked {
                        task,
                        generation,
                        error: panic_msg,
                    },
                    "TaskPanicked",
                )
                .await;
            }
        }
    });
}

/// Execute a fetch request from the browsing core on a background task.
///
/// Stale completions are not cancelled here; the generation tag on the
/// resulting event lets the browser drop them on arrival.
pub(super) fn dispatch(
    catalogue: &CatalogueClient,
    request: FetchRequest,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = catalogue.clone();
    let tag = request.generation();
    match request {
        FetchRequest::Genres => {
            spawn_reporting("genres", tag, tx.clone(), async move {
                AppEvent::GenresLoaded(client.fetch_genres().await)
            });
        }
        FetchRequest::Page { generation, page } => {
            spawn_reporting("films", tag, tx.clone(), async move {
                AppEvent::FilmsLoaded {
                    generation,
                    result: client.fetch_films(page).await,
                }
            });
        }
        FetchRequest::Search { generation, query } => {
            spawn_reporting("search", tag, tx.clone(), async move {
                AppEvent::FilmsLoaded {
                    generation,
                    result: client.search_films(&query).await,
                }
            });
        }
    }
}

/// Load the user's liked films into the favorites view.
///
/// Returns false when favorites are not configured.
pub(super) fn spawn_favorites_load(app: &mut App, tx: &mpsc::Sender<AppEvent>) -> bool {
    let Some((store, email)) = app.favorites_backend() else {
        return false;
    };
    let catalogue = app.catalogue.clone();
    app.liked_loading = true;
    tracing::debug!(user = %email, "Loading favorites");

    spawn_reporting("favorites", None, tx.clone(), async move {
        AppEvent::FavoritesLoaded(load_liked_films(&store, &catalogue, &email).await)
    });
    true
}

/// Read the user's favorite keys so toggling knows what is already liked.
///
/// Only the store is read; no film lookups. Returns false when favorites
/// are not configured.
pub(super) fn spawn_favorite_keys_load(app: &App, tx: &mpsc::Sender<AppEvent>) -> bool {
    let Some((store, email)) = app.favorites_backend() else {
        return false;
    };
    tracing::debug!(user = %email, "Loading favorite keys");

    spawn_reporting("favorite-keys", None, tx.clone(), async move {
        let result = store
            .fetch_favorites()
            .await
            .map(|all| favorites_for(all, &email));
        AppEvent::FavoriteKeysLoaded(result)
    });
    true
}

/// Add or remove the favorite for `film_id`, depending on current state.
pub(super) fn spawn_favorite_toggle(
    app: &mut App,
    film_id: u64,
    title: String,
    tx: &mpsc::Sender<AppEvent>,
) {
    let Some((store, email)) = app.favorites_backend() else {
        app.set_status("Favorites need firebase_database_url and user_email");
        return;
    };
    if !app.favorite_keys_loaded {
        // Without the keys an existing favorite would be added twice
        app.set_status("Favorites are still loading, try again shortly");
        return;
    }
    if app.favorite_pending.contains(&film_id) {
        return;
    }
    app.favorite_pending.push(film_id);

    match app.favorite_keys.get(&film_id).cloned() {
        Some(key) => {
            tracing::debug!(film_id, key = %key, "Removing favorite");
            spawn_reporting("favorite-remove", None, tx.clone(), async move {
                AppEvent::FavoriteRemoved {
                    film_id,
                    title,
                    result: store.remove_favorite(&key).await,
                }
            });
        }
        None => {
            tracing::debug!(film_id, "Adding favorite");
            spawn_reporting("favorite-add", None, tx.clone(), async move {
                AppEvent::FavoriteAdded {
                    film_id,
                    title,
                    result: store.add_favorite(&email, film_id).await,
                }
            });
        }
    }
}

/// Load the comments for the film shown in the comments view.
pub(super) fn spawn_comments_load(store: RealtimeStore, film_id: u64, tx: &mpsc::Sender<AppEvent>) {
    spawn_reporting("comments", None, tx.clone(), async move {
        AppEvent::CommentsLoaded {
            film_id,
            result: store.fetch_comments(film_id).await,
        }
    });
}
