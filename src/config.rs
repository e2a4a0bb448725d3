//! Configuration file parser for ~/.config/filmcheck/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as likely typos.
//! `TMDB_API_KEY` and `FIREBASE_AUTH_TOKEN` in the environment take
//! precedence over the corresponding keys in the file.
use crate::catalogue::DEFAULT_BASE_URL;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// `Debug` masks the API key and auth token.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalogue API key (alternative to the TMDB_API_KEY env var).
    pub tmdb_api_key: Option<String>,

    /// Catalogue API root.
    pub tmdb_base_url: String,

    /// Language tag sent with every catalogue request.
    pub language: String,

    /// Realtime database root holding favorites and comments.
    /// Favorites and comments are unavailable when unset.
    pub firebase_database_url: Option<String>,

    /// Database secret or ID token (alternative to FIREBASE_AUTH_TOKEN).
    pub firebase_auth_token: Option<String>,

    /// Identity used to filter and write favorites.
    pub user_email: Option<String>,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_base_url: DEFAULT_BASE_URL.to_string(),
            language: "en-US".to_string(),
            firebase_database_url: None,
            firebase_auth_token: None,
            user_email: None,
            request_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "tmdb_api_key",
                &self.tmdb_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("language", &self.language)
            .field("firebase_database_url", &self.firebase_database_url)
            .field(
                "firebase_auth_token",
                &self.firebase_auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user_email", &self.user_email)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

const KNOWN_KEYS: [&str; 7] = [
    "tmdb_api_key",
    "tmdb_base_url",
    "language",
    "firebase_database_url",
    "firebase_auth_token",
    "user_email",
    "request_timeout_secs",
];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            base_url = %config.tmdb_base_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Catalogue API key: `TMDB_API_KEY` env var, else the config file.
    pub fn api_key(&self) -> Option<SecretString> {
        secret_from(std::env::var("TMDB_API_KEY").ok(), self.tmdb_api_key.as_deref())
    }

    /// Realtime database token: `FIREBASE_AUTH_TOKEN` env var, else the
    /// config file.
    pub fn auth_token(&self) -> Option<SecretString> {
        secret_from(
            std::env::var("FIREBASE_AUTH_TOKEN").ok(),
            self.firebase_auth_token.as_deref(),
        )
    }
}

/// Prefer the environment value; blank values count as unset.
fn secret_from(env: Option<String>, file: Option<&str>) -> Option<SecretString> {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| {
            file.filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        })
        .map(SecretString::from)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("filmcheck_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.language, "en-US");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.firebase_database_url.is_none());
        assert!(config.user_email.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/filmcheck_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.language, "en-US");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "  \n\n ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_partial_config() {
        let path = write_config(
            "partial",
            r#"
language = "fr-FR"
user_email = "me@example.com"
firebase_database_url = "https://demo-default-rtdb.firebaseio.com"
"#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.language, "fr-FR");
        assert_eq!(config.user_email.as_deref(), Some("me@example.com"));
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "language = \"de-DE\"\ntheme = \"dark\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.language, "de-DE");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let path = write_config("wrongtype", "request_timeout_secs = \"soon\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_env_secret_takes_precedence() {
        let secret = secret_from(Some("from-env".into()), Some("from-file")).unwrap();
        assert_eq!(secret.expose_secret(), "from-env");

        let secret = secret_from(Some("  ".into()), Some("from-file")).unwrap();
        assert_eq!(secret.expose_secret(), "from-file");

        assert!(secret_from(None, Some("")).is_none());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = Config {
            tmdb_api_key: Some("tmdb-secret-123".to_string()),
            firebase_auth_token: Some("fb-secret-456".to_string()),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("tmdb-secret-123"));
        assert!(!debug_output.contains("fb-secret-456"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
