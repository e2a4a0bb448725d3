use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Types
// ============================================================================

/// A catalogue genre. Immutable once fetched for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// A film from the catalogue.
///
/// `genres` is derived: it is empty as decoded from a listing and populated
/// by [`crate::catalogue::resolve`] against the session genre table. Its
/// length never exceeds `genre_ids.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    pub id: u64,
    pub title: String,
    pub genre_ids: Vec<u64>,
    pub genres: Vec<Genre>,
    pub poster_path: Option<String>,
    pub overview: String,
    pub vote_average: f32,
    pub release_date: Option<String>,
}

impl Film {
    /// Genre names joined for display, e.g. `"Action, Drama"`.
    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Release year parsed from `release_date` (`YYYY-MM-DD`).
    ///
    /// The catalogue sends `""` for unknown dates, so anything unparseable
    /// yields `None`.
    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;

        let date = self.release_date.as_deref()?;
        chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Body of the genre-list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct GenreListResponse {
    pub genres: Vec<Genre>,
}

/// Body of the paginated listing and search endpoints.
///
/// `results` is required: a body without it is a shape mismatch, not an
/// empty page.
#[derive(Debug, Deserialize)]
pub(crate) struct FilmPageResponse {
    #[serde(default)]
    pub page: Option<u32>,
    pub results: Vec<FilmRecord>,
}

/// One film as it appears in listing/search results.
#[derive(Debug, Deserialize)]
pub(crate) struct FilmRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl From<FilmRecord> for Film {
    fn from(r: FilmRecord) -> Self {
        Film {
            id: r.id,
            title: r.title,
            genre_ids: r.genre_ids,
            genres: Vec::new(),
            poster_path: r.poster_path,
            overview: r.overview.unwrap_or_default(),
            vote_average: r.vote_average.unwrap_or_default(),
            release_date: r.release_date.filter(|d| !d.is_empty()),
        }
    }
}

/// Body of the single-film endpoint. Genres arrive already joined.
#[derive(Debug, Deserialize)]
pub(crate) struct FilmDetailResponse {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl From<FilmDetailResponse> for Film {
    fn from(r: FilmDetailResponse) -> Self {
        Film {
            id: r.id,
            title: r.title,
            genre_ids: r.genres.iter().map(|g| g.id).collect(),
            genres: r.genres,
            poster_path: r.poster_path,
            overview: r.overview.unwrap_or_default(),
            vote_average: r.vote_average.unwrap_or_default(),
            release_date: r.release_date.filter(|d| !d.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_missing_title_is_rejected() {
        let body = r#"{"page":1,"results":[{"id":1,"genre_ids":[2]}]}"#;
        assert!(serde_json::from_str::<FilmPageResponse>(body).is_err());
    }

    #[test]
    fn test_record_unknown_fields_ignored() {
        let body = r#"{"page":1,"total_pages":9,"results":[
            {"id":7,"title":"Heat","genre_ids":[80],"adult":false,"popularity":12.5}
        ]}"#;
        let page: FilmPageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.page, Some(1));
        let film = Film::from(page.results.into_iter().next().unwrap());
        assert_eq!(film.id, 7);
        assert_eq!(film.genre_ids, vec![80]);
        assert!(film.genres.is_empty());
        assert_eq!(film.overview, "");
    }

    #[test]
    fn test_page_number_optional() {
        let page: FilmPageResponse = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert_eq!(page.page, None);
    }

    #[test]
    fn test_missing_results_is_rejected() {
        assert!(serde_json::from_str::<FilmPageResponse>(r#"{"page":1}"#).is_err());
    }

    #[test]
    fn test_detail_populates_ids_and_genres() {
        let body = r#"{"id":42,"title":"Alien","genres":[{"id":27,"name":"Horror"},{"id":878,"name":"Science Fiction"}],"release_date":"1979-05-25"}"#;
        let film = Film::from(serde_json::from_str::<FilmDetailResponse>(body).unwrap());
        assert_eq!(film.genre_ids, vec![27, 878]);
        assert_eq!(film.genre_names(), "Horror, Science Fiction");
        assert_eq!(film.release_year(), Some(1979));
    }

    #[test]
    fn test_empty_release_date_is_none() {
        let body = r#"{"id":1,"title":"Untitled","release_date":""}"#;
        let record: FilmRecord = serde_json::from_str(body).unwrap();
        let film = Film::from(record);
        assert_eq!(film.release_date, None);
        assert_eq!(film.release_year(), None);
    }
}
