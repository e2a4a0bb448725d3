use thiserror::Error;
use url::Url;

/// Errors from validating a configured service base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP pointed at a non-local host.
    #[error("Insecure base URL {0}: HTTPS required (except localhost for testing)")]
    Insecure(String),
}

/// Validates a base URL for an API that receives credentials.
///
/// API keys and auth tokens ride along as query parameters, so plain HTTP is
/// only accepted for loopback hosts (mock servers in tests, local emulators).
///
/// Trailing slashes are stripped so callers can append `/path` segments.
///
/// # Examples
///
/// ```
/// use filmcheck::util::validate_base_url;
///
/// let url = validate_base_url("https://api.themoviedb.org/3/").unwrap();
/// assert_eq!(url, "https://api.themoviedb.org/3");
///
/// assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
/// assert!(validate_base_url("http://api.example.com").is_err());
/// assert!(validate_base_url("ftp://api.example.com").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<String, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => {}
        "http" => {
            let is_local = matches!(
                url.host_str(),
                Some("localhost") | Some("127.0.0.1") | Some("[::1]")
            );
            if !is_local {
                return Err(UrlValidationError::Insecure(url_str.to_owned()));
            }
            tracing::warn!(base_url = %url_str, "Using non-HTTPS base URL (localhost only)");
        }
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    Ok(url_str.trim_end_matches('/').to_string())
}
