//! Realtime data store access for favorites and comments.
//!
//! - [`realtime`] - REST client for the realtime database: favorites
//!   read/add/remove and per-film comments
//! - [`favorites`] - the liked-films flow: one read of all favorites,
//!   client-side filter by user email, then a film lookup per favorite

mod favorites;
mod realtime;

pub use favorites::{favorites_for, load_liked_films, LikedFilm, LikedFilms};
pub use realtime::{Comment, Favorite, FavoriteRecord, RealtimeStore, StoreError};
