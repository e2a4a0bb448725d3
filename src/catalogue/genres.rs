use super::types::{Film, Genre};

/// Session-cached genre table.
///
/// Lookup is first-match by id; the catalogue is assumed to send unique ids,
/// but a duplicate never causes an error. An empty table is valid and is the
/// state before (or after a failed) genre fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreTable {
    genres: Vec<Genre>,
}

impl GenreTable {
    pub fn new(genres: Vec<Genre>) -> Self {
        Self { genres }
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    /// First genre with the given id, if any.
    pub fn get(&self, id: u64) -> Option<&Genre> {
        self.genres.iter().find(|g| g.id == id)
    }
}

/// Annotate a film with display-ready genres.
///
/// `film.genres` becomes the genres of `film.genre_ids`, in id order, for
/// every id present in `table`. Unknown ids are dropped silently. Any
/// previously resolved genres are replaced.
pub fn resolve(mut film: Film, table: &GenreTable) -> Film {
    film.genres = join_ids(&film.genre_ids, table);
    film
}

/// Resolve a batch of films in place.
pub fn resolve_all(films: &mut [Film], table: &GenreTable) {
    for film in films.iter_mut() {
        film.genres = join_ids(&film.genre_ids, table);
    }
}

fn join_ids(ids: &[u64], table: &GenreTable) -> Vec<Genre> {
    ids.iter().filter_map(|id| table.get(*id).cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn film(id: u64, genre_ids: Vec<u64>) -> Film {
        Film {
            id,
            title: format!("Film {}", id),
            genre_ids,
            genres: Vec::new(),
            poster_path: None,
            overview: String::new(),
            vote_average: 0.0,
            release_date: None,
        }
    }

    fn genre(id: u64, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_unknown_id_dropped() {
        let table = GenreTable::new(vec![genre(1, "Action")]);
        let resolved = resolve(film(42, vec![1, 2]), &table);
        assert_eq!(resolved.genres, vec![genre(1, "Action")]);
        assert_eq!(resolved.genre_ids, vec![1, 2]);
    }

    #[test]
    fn test_empty_table_gives_empty_genres() {
        let resolved = resolve(film(1, vec![1, 2, 3]), &GenreTable::default());
        assert!(resolved.genres.is_empty());
    }

    #[test]
    fn test_first_match_wins_on_duplicate_table_ids() {
        let table = GenreTable::new(vec![genre(5, "Drama"), genre(5, "Duplicate")]);
        let resolved = resolve(film(1, vec![5]), &table);
        assert_eq!(resolved.genres, vec![genre(5, "Drama")]);
    }

    #[test]
    fn test_order_follows_film_ids() {
        let table = GenreTable::new(vec![genre(1, "Action"), genre(2, "Comedy")]);
        let resolved = resolve(film(1, vec![2, 1]), &table);
        assert_eq!(resolved.genre_names(), "Comedy, Action");
    }

    #[test]
    fn test_resolve_replaces_previous_genres() {
        let mut f = film(1, vec![1]);
        f.genres = vec![genre(9, "Stale")];
        let resolved = resolve(f, &GenreTable::new(vec![genre(1, "Action")]));
        assert_eq!(resolved.genres, vec![genre(1, "Action")]);
    }

    #[test]
    fn test_resolve_all_in_place() {
        let table = GenreTable::new(vec![genre(1, "Action")]);
        let mut films = vec![film(1, vec![1]), film(2, vec![3])];
        resolve_all(&mut films, &table);
        assert_eq!(films[0].genres.len(), 1);
        assert!(films[1].genres.is_empty());
    }

    proptest! {
        #[test]
        fn prop_resolved_genres_come_from_film_ids(
            table_ids in proptest::collection::hash_set(0u64..50, 0..20),
            film_ids in proptest::collection::vec(0u64..50, 0..20),
        ) {
            let table = GenreTable::new(
                table_ids.iter().map(|id| genre(*id, &format!("g{}", id))).collect(),
            );
            let resolved = resolve(film(1, film_ids.clone()), &table);

            prop_assert!(resolved.genres.len() <= film_ids.len());
            for g in &resolved.genres {
                prop_assert!(film_ids.contains(&g.id));
                prop_assert!(table_ids.contains(&g.id));
            }
        }

        #[test]
        fn prop_no_duplicates_without_duplicate_ids(
            table_ids in proptest::collection::hash_set(0u64..50, 0..20),
            film_ids in proptest::collection::hash_set(0u64..50, 0..20),
        ) {
            let table = GenreTable::new(
                table_ids.iter().map(|id| genre(*id, &format!("g{}", id))).collect(),
            );
            let ids: Vec<u64> = film_ids.into_iter().collect();
            let resolved = resolve(film(1, ids), &table);

            let unique: HashSet<u64> = resolved.genres.iter().map(|g| g.id).collect();
            prop_assert_eq!(unique.len(), resolved.genres.len());
        }
    }
}
