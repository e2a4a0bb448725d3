//! Integration tests for the favorites flow: read all favorites, filter by
//! user, look each film up in the catalogue.
//!
//! The realtime database and the catalogue are both served by wiremock.

use filmcheck::catalogue::CatalogueClient;
use filmcheck::store::{load_liked_films, RealtimeStore, StoreError};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalogue(server: &MockServer) -> CatalogueClient {
    CatalogueClient::new(
        reqwest::Client::new(),
        &server.uri(),
        SecretString::from("test-key".to_string()),
        "en-US",
    )
    .unwrap()
}

fn store(server: &MockServer) -> RealtimeStore {
    RealtimeStore::new(reqwest::Client::new(), &server.uri(), None).unwrap()
}

async fn mount_film(server: &MockServer, id: u64, title: &str) {
    let body = serde_json::json!({
        "id": id,
        "title": title,
        "genres": [{"id": 18, "name": "Drama"}],
        "overview": "",
        "vote_average": 8.0,
        "release_date": "1999-10-15"
    });
    Mock::given(method("GET"))
        .and(path(format!("/movie/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_favorites(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/favoris.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn sorted_titles(liked: &filmcheck::store::LikedFilms) -> Vec<String> {
    let mut titles: Vec<String> = liked.films.iter().map(|l| l.film.title.clone()).collect();
    titles.sort();
    titles
}

// ============================================================================
// Loading Liked Films
// ============================================================================

#[tokio::test]
async fn test_only_my_favorites_are_loaded() {
    let db = MockServer::start().await;
    let tmdb = MockServer::start().await;
    mount_favorites(
        &db,
        serde_json::json!({
            "-Na": {"userEmail": "me@example.com", "filmId": 550},
            "-Nb": {"userEmail": "other@example.com", "filmId": 13},
            "-Nc": {"userEmail": "me@example.com", "filmId": 680}
        }),
    )
    .await;
    mount_film(&tmdb, 550, "Fight Club").await;
    mount_film(&tmdb, 680, "Pulp Fiction").await;

    let liked = load_liked_films(&store(&db), &catalogue(&tmdb), "me@example.com")
        .await
        .unwrap();

    assert_eq!(sorted_titles(&liked), vec!["Fight Club", "Pulp Fiction"]);
    assert_eq!(liked.failed, 0);
    let fight_club = liked.films.iter().find(|l| l.film.id == 550).unwrap();
    assert_eq!(fight_club.favorite.key, "-Na");
    assert_eq!(fight_club.film.genre_names(), "Drama");
}

#[tokio::test]
async fn test_missing_film_is_skipped() {
    let db = MockServer::start().await;
    let tmdb = MockServer::start().await;
    mount_favorites(
        &db,
        serde_json::json!({
            "-Na": {"userEmail": "me@example.com", "filmId": 550},
            "-Nb": {"userEmail": "me@example.com", "filmId": 404404}
        }),
    )
    .await;
    mount_film(&tmdb, 550, "Fight Club").await;
    Mock::given(method("GET"))
        .and(path("/movie/404404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&tmdb)
        .await;

    let liked = load_liked_films(&store(&db), &catalogue(&tmdb), "me@example.com")
        .await
        .unwrap();

    assert_eq!(sorted_titles(&liked), vec!["Fight Club"]);
    assert_eq!(liked.failed, 1);
}

#[tokio::test]
async fn test_array_snapshot_with_holes() {
    let db = MockServer::start().await;
    let tmdb = MockServer::start().await;
    mount_favorites(
        &db,
        serde_json::json!([
            null,
            {"userEmail": "me@example.com", "filmId": 550}
        ]),
    )
    .await;
    mount_film(&tmdb, 550, "Fight Club").await;

    let liked = load_liked_films(&store(&db), &catalogue(&tmdb), "me@example.com")
        .await
        .unwrap();

    assert_eq!(sorted_titles(&liked), vec!["Fight Club"]);
    assert_eq!(liked.films[0].favorite.key, "1");
}

#[tokio::test]
async fn test_empty_node_means_no_favorites() {
    let db = MockServer::start().await;
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favoris.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&db)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tmdb)
        .await;

    let liked = load_liked_films(&store(&db), &catalogue(&tmdb), "me@example.com")
        .await
        .unwrap();
    assert!(liked.films.is_empty());
}

#[tokio::test]
async fn test_store_failure_fails_whole_load() {
    let db = MockServer::start().await;
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favoris.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&db)
        .await;

    let err = load_liked_films(&store(&db), &catalogue(&tmdb), "me@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::HttpStatus(401)));
}

// ============================================================================
// Add / Remove
// ============================================================================

#[tokio::test]
async fn test_add_then_remove_favorite() {
    let db = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/favoris.json"))
        .and(query_param("auth", "db-token"))
        .and(body_json(serde_json::json!({
            "userEmail": "me@example.com",
            "filmId": 550
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"-NewKey1"}"#))
        .expect(1)
        .mount(&db)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/favoris/-NewKey1.json"))
        .and(query_param("auth", "db-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&db)
        .await;

    let store = RealtimeStore::new(
        reqwest::Client::new(),
        &db.uri(),
        Some(SecretString::from("db-token".to_string())),
    )
    .unwrap();

    let key = store.add_favorite("me@example.com", 550).await.unwrap();
    assert_eq!(key, "-NewKey1");
    store.remove_favorite(&key).await.unwrap();
}
