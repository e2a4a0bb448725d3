//! Size-limited response body reading.

use futures::StreamExt;
use thiserror::Error;

/// A response body exceeded the caller's limit (in bytes).
#[derive(Debug, Error)]
#[error("Response too large (exceeds {0} bytes)")]
pub struct ResponseTooLarge(pub usize);

/// Read a response body, giving up once it passes `limit` bytes.
///
/// A declared `Content-Length` over the limit fails before any body is
/// read; otherwise the stream is cut off as soon as it crosses the limit.
pub async fn read_limited_bytes<E>(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, E>
where
    E: From<reqwest::Error> + From<ResponseTooLarge>,
{
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(ResponseTooLarge(limit).into());
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ResponseTooLarge(limit).into());
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
