//! Bounded reads of upstream response bodies.

use thiserror::Error;

/// Largest upstream body the bridge will buffer. Token and STS answers are a
/// few kilobytes.
pub const MAX_UPSTREAM_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("response body exceeds {0} bytes")]
    TooLarge(usize),
    #[error("reading response body: {0}")]
    Transport(reqwest::Error),
}

/// Read `resp` as text, giving up once more than `limit` bytes arrive.
pub async fn read_limited(mut resp: reqwest::Response, limit: usize) -> Result<String, BodyError> {
    if resp.content_length().is_some_and(|len| len > limit as u64) {
        return Err(BodyError::TooLarge(limit));
    }

    let mut buf = Vec::new();
    while let Some(chunk) = resp
        .chunk()
        .await
        .map_err(|e| BodyError::Transport(e.without_url()))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
