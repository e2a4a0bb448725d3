//! Input handling for the TUI.
//!
//! Keyboard input is dispatched on the current view and mode. Browsing
//! input is translated into browser events; whatever fetch the browser
//! asks for is handed to a background task.

use crate::app::{App, AppEvent, View};
use crate::catalogue::CatalogueClient;
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{dispatch, spawn_comments_load, spawn_favorite_toggle, spawn_favorites_load};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.search_mode {
        handle_search_input(app, code, event_tx);
        return Action::Continue;
    }

    match app.view {
        View::Browse => handle_browse_input(app, code, event_tx),
        View::Favorites => handle_favorites_input(app, code, event_tx),
        View::Comments => handle_comments_input(app, code),
    }
}

/// Keys shared by the browse and favorites lists.
///
/// Returns true if the key was consumed.
fn handle_film_action(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    match code {
        KeyCode::Char('f') => {
            if let Some(film) = app.selected_film() {
                let (id, title) = (film.id, film.title.clone());
                spawn_favorite_toggle(app, id, title, event_tx);
            }
        }
        KeyCode::Char('c') => {
            let Some((id, title)) = app.selected_film().map(|f| (f.id, f.title.clone())) else {
                return true;
            };
            let Some(store) = app.store.clone() else {
                app.set_status("Comments need firebase_database_url");
                return true;
            };
            app.enter_comments(id, title);
            spawn_comments_load(store, id, event_tx);
        }
        KeyCode::Char('o') => {
            if let Some(film) = app.selected_film() {
                let url = CatalogueClient::film_page_url(film.id);
                if let Err(e) = open::that(&url) {
                    app.set_status(format!("Failed to open browser: {}", e));
                } else {
                    app.set_status(format!("Opening {}...", url));
                }
            }
        }
        _ => return false,
    }
    true
}

/// Handle input in the browse view.
fn handle_browse_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    if handle_film_action(app, code, event_tx) {
        return Action::Continue;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            if app.nav_down() {
                if let Some(request) = app.browser.on_scrolled_to_bottom() {
                    dispatch(&app.catalogue, request, event_tx);
                }
            }
        }
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('/') => {
            app.search_mode = true;
            app.search_input = app.browser.query().to_string();
        }
        KeyCode::Esc => {
            // Leave a committed search and return to browsing
            if !app.browser.query().is_empty() {
                close_search(app, event_tx);
            }
        }
        KeyCode::Char('g') => match app.browser.reload_genres() {
            Some(request) => {
                app.set_status("Reloading genres...");
                dispatch(&app.catalogue, request, event_tx);
            }
            None => app.set_status("Genre reload already in progress"),
        },
        KeyCode::Char('F') => open_favorites(app, event_tx),
        _ => {}
    }
    Action::Continue
}

/// Handle input while typing a search query.
///
/// Every edit is a search-changed event; the browser resets and refetches
/// immediately.
fn handle_search_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Esc => close_search(app, event_tx),
        KeyCode::Enter => {
            // Keep the results, stop typing
            app.search_mode = false;
        }
        KeyCode::Backspace => {
            if app.search_input.pop().is_some() {
                search_changed(app, event_tx);
            }
        }
        KeyCode::Char(c) => {
            if app.search_input.len() >= MAX_SEARCH_QUERY_LENGTH {
                app.set_status(format!(
                    "Search query at max length ({} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
                return;
            }
            app.search_input.push(c);
            search_changed(app, event_tx);
        }
        _ => {}
    }
}

fn search_changed(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let request = app.browser.on_search_changed(&app.search_input);
    app.selected_film = 0;
    dispatch(&app.catalogue, request, event_tx);
}

fn close_search(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.search_mode = false;
    app.search_input.clear();
    app.selected_film = 0;
    let request = app.browser.on_search_closed();
    dispatch(&app.catalogue, request, event_tx);
}

/// Switch to the favorites view and (re)load the liked films.
pub(super) fn open_favorites(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.liked_loading {
        app.view = View::Favorites;
        return;
    }
    if spawn_favorites_load(app, event_tx) {
        app.view = View::Favorites;
        app.selected_liked = 0;
    } else {
        app.set_status("Favorites need firebase_database_url and user_email");
    }
}

/// Handle input in the favorites view.
fn handle_favorites_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if handle_film_action(app, code, event_tx) {
        return Action::Continue;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            app.nav_down();
        }
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('r') => open_favorites(app, event_tx),
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('F') => {
            app.view = View::Browse;
            app.clamp_selections();
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input in the comments view.
fn handle_comments_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            app.nav_down();
        }
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('c') => app.exit_comments(),
        _ => {}
    }
    Action::Continue
}
