//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `helpers` - Background task spawning
//! - `render` - View rendering dispatch
//! - `films` - Film list widget (browse and favorites)
//! - `detail` - Film detail pane
//! - `comments` - Comments view
//! - `status` - Status bar widget

mod comments;
mod detail;
mod events;
mod films;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};

use crate::app::{App, AppEvent};
use tokio::sync::mpsc;

/// Kick off the first fetches before the loop starts.
///
/// Starts the browser (genre fetch), reads the user's favorite keys so
/// liked films are marked from the first frame, optionally begins a search
/// for `initial_query`, and optionally opens the favorites view.
pub fn start(
    app: &mut App,
    initial_query: Option<&str>,
    show_favorites: bool,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let request = app.browser.start();
    helpers::dispatch(&app.catalogue, request, event_tx);
    helpers::spawn_favorite_keys_load(app, event_tx);

    if let Some(query) = initial_query.map(str::trim).filter(|q| !q.is_empty()) {
        app.search_input = query.to_string();
        let request = app.browser.on_search_changed(query);
        helpers::dispatch(&app.catalogue, request, event_tx);
    }

    if show_favorites {
        input::open_favorites(app, event_tx);
    }
}
