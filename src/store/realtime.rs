use crate::util::{read_limited_bytes, validate_base_url, ResponseTooLarge, UrlValidationError};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Node holding favorite records.
const FAVORITES_NODE: &str = "favoris";
/// Node holding comment records.
const COMMENTS_NODE: &str = "commentaires";

/// Largest snapshot body read from the store. Reads return whole nodes.
const MAX_SNAPSHOT_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors from the realtime data store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Snapshot did not match the record schema
    #[error("Malformed snapshot: {0}")]
    Decode(String),
    /// Record key contains characters the store forbids in paths
    #[error("Invalid record key: {0}")]
    InvalidKey(String),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error(transparent)]
    InvalidBaseUrl(#[from] UrlValidationError),
}

impl From<ResponseTooLarge> for StoreError {
    fn from(e: ResponseTooLarge) -> Self {
        StoreError::ResponseTooLarge(e.0)
    }
}

// ============================================================================
// Records
// ============================================================================

/// A favorite as stored: which user liked which film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub user_email: String,
    pub film_id: u64,
}

/// A favorite record together with the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub key: String,
    pub user_email: String,
    pub film_id: u64,
}

/// A user comment on a film.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub user_email: String,
    pub comment: String,
    pub film_id: u64,
}

/// A node snapshot. The store renders nodes whose keys are all small
/// integers as JSON arrays (with `null` holes), everything else as objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot<T> {
    Map(BTreeMap<String, Option<T>>),
    List(Vec<Option<T>>),
}

impl<T> Snapshot<T> {
    /// Flatten into `(key, record)` pairs in key order, skipping holes.
    fn into_entries(self) -> Vec<(String, T)> {
        match self {
            Snapshot::Map(map) => map
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k, v)))
                .collect(),
            Snapshot::List(list) => list
                .into_iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i.to_string(), v)))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

// ============================================================================
// Client
// ============================================================================

/// REST client for the realtime database holding favorites and comments.
#[derive(Clone)]
pub struct RealtimeStore {
    http: reqwest::Client,
    base_url: String,
    auth: Option<Arc<SecretString>>,
}

impl std::fmt::Debug for RealtimeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeStore")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RealtimeStore {
    /// Create a store client for the database at `base_url`.
    ///
    /// `auth` (a database secret or ID token) is sent as the `auth` query
    /// parameter when present.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        auth: Option<SecretString>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            http,
            base_url: validate_base_url(base_url)?,
            auth: auth.map(Arc::new),
        })
    }

    /// One-time read of every favorite record, for every user.
    ///
    /// An absent node reads as no favorites.
    pub async fn fetch_favorites(&self) -> Result<Vec<Favorite>, StoreError> {
        let snapshot: Option<Snapshot<FavoriteRecord>> =
            self.get_json(&format!("{}.json", FAVORITES_NODE)).await?;

        let favorites: Vec<Favorite> = snapshot
            .map(Snapshot::into_entries)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, r)| Favorite {
                key,
                user_email: r.user_email,
                film_id: r.film_id,
            })
            .collect();

        tracing::debug!(count = favorites.len(), "Read favorites node");
        Ok(favorites)
    }

    /// Store a new favorite and return its generated key.
    pub async fn add_favorite(&self, user_email: &str, film_id: u64) -> Result<String, StoreError> {
        let record = FavoriteRecord {
            user_email: user_email.to_string(),
            film_id,
        };
        let url = self.url(&format!("{}.json", FAVORITES_NODE));
        let response = self
            .with_auth(self.http.post(&url))
            .json(&record)
            .send()
            .await?;
        let pushed: PushResponse = decode_response(response).await?;

        tracing::info!(film_id, key = %pushed.name, "Favorite added");
        Ok(pushed.name)
    }

    /// Delete the favorite stored under `key`.
    pub async fn remove_favorite(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let url = self.url(&format!("{}/{}.json", FAVORITES_NODE, key));
        let response = self.with_auth(self.http.delete(&url)).send().await?;
        if !response.status().is_success() {
            return Err(StoreError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(key = %key, "Favorite removed");
        Ok(())
    }

    /// Comments attached to `film_id`, in key (insertion) order.
    pub async fn fetch_comments(&self, film_id: u64) -> Result<Vec<Comment>, StoreError> {
        let snapshot: Option<Snapshot<Comment>> =
            self.get_json(&format!("{}.json", COMMENTS_NODE)).await?;

        let comments: Vec<Comment> = snapshot
            .map(Snapshot::into_entries)
            .unwrap_or_default()
            .into_iter()
            .map(|(_, c)| c)
            .filter(|c| c.film_id == film_id)
            .collect();

        tracing::debug!(film_id, count = comments.len(), "Loaded comments");
        Ok(comments)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some(token) => request.query(&[("auth", token.expose_secret())]),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self.with_auth(self.http.get(self.url(path))).send().await?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    if !response.status().is_success() {
        return Err(StoreError::HttpStatus(response.status().as_u16()));
    }
    let bytes = read_limited_bytes::<StoreError>(response, MAX_SNAPSHOT_SIZE).await?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Keys become path segments; reject anything the store would treat as
/// structure.
fn validate_key(key: &str) -> Result<(), StoreError> {
    const FORBIDDEN: &[char] = &['/', '.', '#', '$', '[', ']', '?', '&'];
    if key.is_empty() || key.contains(FORBIDDEN) || key.chars().any(char::is_control) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer, auth: Option<&str>) -> RealtimeStore {
        RealtimeStore::new(
            reqwest::Client::new(),
            &server.uri(),
            auth.map(|a| SecretString::from(a.to_string())),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_oversized_snapshot_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commentaires.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("x".repeat(MAX_SNAPSHOT_SIZE + 1)),
            )
            .mount(&server)
            .await;

        let err = store(&server, None).fetch_comments(7).await.unwrap_err();
        assert!(matches!(err, StoreError::ResponseTooLarge(MAX_SNAPSHOT_SIZE)));
    }

    #[tokio::test]
    async fn test_null_node_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/favoris.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        assert!(store(&server, None).fetch_favorites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_map_snapshot_keeps_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/favoris.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"-Nb":{"userEmail":"b@x.com","filmId":2},"-Na":{"userEmail":"a@x.com","filmId":1}}"#,
            ))
            .mount(&server)
            .await;

        let favs = store(&server, None).fetch_favorites().await.unwrap();
        assert_eq!(favs.len(), 2);
        assert_eq!(favs[0].key, "-Na");
        assert_eq!(favs[0].film_id, 1);
    }

    #[tokio::test]
    async fn test_array_snapshot_with_holes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/favoris.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[null,{"userEmail":"a@x.com","filmId":550}]"#,
            ))
            .mount(&server)
            .await;

        let favs = store(&server, None).fetch_favorites().await.unwrap();
        assert_eq!(
            favs,
            vec![Favorite {
                key: "1".to_string(),
                user_email: "a@x.com".to_string(),
                film_id: 550
            }]
        );
    }

    #[tokio::test]
    async fn test_malformed_record_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/favoris.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"k1":{"userEmail":"a@x.com","filmId":"not-a-number"}}"#),
            )
            .mount(&server)
            .await;

        match store(&server, None).fetch_favorites().await.unwrap_err() {
            StoreError::Decode(_) => {}
            e => panic!("Expected Decode, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_auth_token_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/favoris.json"))
            .and(query_param("auth", "secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;

        store(&server, Some("secret-token"))
            .fetch_favorites()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_favorite_returns_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/favoris.json"))
            .and(body_json(serde_json::json!({"userEmail":"a@x.com","filmId":42})))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"-NewKey"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let key = store(&server, None).add_favorite("a@x.com", 42).await.unwrap();
        assert_eq!(key, "-NewKey");
    }

    #[tokio::test]
    async fn test_remove_favorite() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/favoris/-NewKey.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;

        store(&server, None).remove_favorite("-NewKey").await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_rejects_path_keys() {
        let server = MockServer::start().await;
        let err = store(&server, None)
            .remove_favorite("../commentaires")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_comments_filtered_by_film() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commentaires.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{
                    "c1":{"userEmail":"a@x.com","comment":"Loved it","filmId":7},
                    "c2":{"userEmail":"b@x.com","comment":"Meh","filmId":8},
                    "c3":{"userEmail":"c@x.com","comment":"Classic","filmId":7}
                }"#,
            ))
            .mount(&server)
            .await;

        let comments = store(&server, None).fetch_comments(7).await.unwrap();
        let texts: Vec<&str> = comments.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(texts, vec!["Loved it", "Classic"]);
    }

    #[test]
    fn test_debug_masks_auth() {
        let s = RealtimeStore::new(
            reqwest::Client::new(),
            "https://demo.firebaseio.com",
            Some(SecretString::from("hunter2".to_string())),
        )
        .unwrap();
        let out = format!("{:?}", s);
        assert!(!out.contains("hunter2"));
    }
}
