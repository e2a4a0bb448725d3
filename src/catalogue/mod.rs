//! Movie catalogue access: HTTP client, film/genre types and the genre join.
//!
//! - [`client`] - [`CatalogueClient`] for genre lists, paginated listings,
//!   free-text search and single-film lookup
//! - [`genres`] - [`GenreTable`] and [`resolve`], which turn a film's raw
//!   genre ids into display names
//! - [`types`] - [`Film`] and [`Genre`] plus the wire schemas they are
//!   decoded from
//!
//! # Example
//!
//! ```ignore
//! let client = CatalogueClient::new(http, DEFAULT_BASE_URL, key, "en-US")?;
//! let table = GenreTable::new(client.fetch_genres().await?);
//! let films: Vec<Film> = client
//!     .fetch_films(1)
//!     .await?
//!     .into_iter()
//!     .map(|f| resolve(f, &table))
//!     .collect();
//! ```

mod client;
mod genres;
mod types;

pub use client::{CatalogueClient, CatalogueError, DEFAULT_BASE_URL};
pub use genres::{resolve, resolve_all, GenreTable};
pub use types::{Film, Genre};
