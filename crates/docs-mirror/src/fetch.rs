use std::sync::Arc;

/// Errors that can occur while retrieving a remote resource.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("gave up on {url} after {attempts} attempts: {message}")]
    Exhausted {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("invalid URL {0}")]
    InvalidUrl(String),
}

/// Retrieves remote text resources.
///
/// `Ok(None)` means the server answered with an HTML page and did not
/// advertise where the raw content lives. That is a content-shape
/// problem, so callers record a skip instead of failing.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError>;
}

#[async_trait::async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        (**self).fetch(url).await
    }
}
