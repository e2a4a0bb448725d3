use super::realtime::{Favorite, RealtimeStore, StoreError};
use crate::catalogue::{CatalogueClient, CatalogueError, Film};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;

/// Film lookups run concurrently, at most this many at a time.
const MAX_CONCURRENT_LOOKUPS: usize = 4;

/// A favorite joined with the film it points at.
#[derive(Debug, Clone)]
pub struct LikedFilm {
    pub favorite: Favorite,
    pub film: Film,
}

/// Result of loading a user's favorites.
#[derive(Debug, Default)]
pub struct LikedFilms {
    /// Films in lookup completion order.
    pub films: Vec<LikedFilm>,
    /// Favorites whose film lookup failed (logged and skipped).
    pub failed: usize,
}

/// The favorites belonging to `user_email`, first record per film.
pub fn favorites_for(favorites: Vec<Favorite>, user_email: &str) -> Vec<Favorite> {
    let mut seen = HashSet::new();
    favorites
        .into_iter()
        .filter(|f| f.user_email == user_email)
        .filter(|f| seen.insert(f.film_id))
        .collect()
}

/// Load the films `user_email` has liked.
///
/// Reads the whole favorites node once, filters it client-side by email,
/// then looks up each surviving film by id. A lookup that fails (including
/// a film the catalogue no longer knows) is logged and skipped; only a
/// failed favorites read fails the whole load.
pub async fn load_liked_films(
    store: &RealtimeStore,
    catalogue: &CatalogueClient,
    user_email: &str,
) -> Result<LikedFilms, StoreError> {
    let mine = favorites_for(store.fetch_favorites().await?, user_email);
    if mine.is_empty() {
        tracing::debug!(user = %user_email, "No favorites for user");
        return Ok(LikedFilms::default());
    }

    let total = mine.len();
    let results: Vec<(Favorite, Result<Film, CatalogueError>)> = stream::iter(mine)
        .map(|favorite| async move {
            let result = catalogue.fetch_film(favorite.film_id).await;
            (favorite, result)
        })
        .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
        .collect()
        .await;

    let mut liked = LikedFilms::default();
    for (favorite, result) in results {
        match result {
            Ok(film) => liked.films.push(LikedFilm { favorite, film }),
            Err(e) => {
                tracing::warn!(
                    film_id = favorite.film_id,
                    key = %favorite.key,
                    error = %e,
                    "Failed to load favorite film"
                );
                liked.failed += 1;
            }
        }
    }

    tracing::info!(total, loaded = liked.films.len(), failed = liked.failed, "Favorites loaded");
    Ok(liked)
}
