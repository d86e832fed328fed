use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{FetchError, Fetcher};

/// Canned response for one URL.
#[derive(Debug, Clone)]
pub enum Canned {
    Text(String),
    /// HTML page with no raw-download pointer.
    Html,
    /// Retries exhausted.
    Fail,
}

/// In-memory fetcher for tests. Unknown URLs fail like an exhausted request.
///
/// Tracks how many fetches overlap so tests can check the concurrency cap.
#[derive(Default)]
pub struct InMemoryFetcher {
    responses: HashMap<String, Canned>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Canned::Text(body.into()));
        self
    }

    pub fn html(mut self, url: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Canned::Html);
        self
    }

    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Canned::Fail);
        self
    }

    /// Serve a manifest listing `urls`, one per line.
    pub fn manifest(self, manifest_url: &str, urls: &[&str]) -> Self {
        let body = urls
            .iter()
            .map(|u| format!("- [page]({u})"))
            .collect::<Vec<_>>()
            .join("\n");
        self.text(manifest_url, body)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for InMemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        self.requests.lock().unwrap().push(url.to_owned());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        // Give sibling fetches a chance to start before this one finishes.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(url) {
            Some(Canned::Text(body)) => Ok(Some(body.clone())),
            Some(Canned::Html) => Ok(None),
            Some(Canned::Fail) | None => Err(FetchError::Exhausted {
                url: url.to_owned(),
                attempts: 4,
                message: "connection refused".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_canned_responses() {
        let fetcher = InMemoryFetcher::new()
            .text("https://h/a.md", "A")
            .html("https://h/b.md")
            .failing("https://h/c.md");

        assert_eq!(fetcher.fetch("https://h/a.md").await.unwrap().as_deref(), Some("A"));
        assert_eq!(fetcher.fetch("https://h/b.md").await.unwrap(), None);
        assert!(fetcher.fetch("https://h/c.md").await.is_err());
        assert!(fetcher.fetch("https://h/unknown.md").await.is_err());
        assert_eq!(fetcher.requests().len(), 4);
    }
}
