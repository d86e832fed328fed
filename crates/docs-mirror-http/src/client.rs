use docs_mirror::{FetchError, Fetcher};
use reqwest::header::CONTENT_TYPE;

use crate::retry::RetryPolicy;

/// Header a docs server sets on an HTML page to say where the raw markdown lives.
pub const RAW_DOWNLOAD_HEADER: &str = "x-raw-download";

const USER_AGENT: &str = "docs-mirror";

/// Fetches pages over HTTP with retries.
///
/// When a page is served as `text/html`, the `x-raw-download` header is
/// followed once to get the raw text. Without that header the page is
/// reported as unavailable (`Ok(None)`).
pub struct HttpFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            retry,
        }
    }

    /// GET `url`, retrying transport failures, timeouts and retryable statuses.
    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let attempts = self.retry.attempts();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.retry.delay_for(attempt - 1);
                tracing::debug!(url, attempt, ?delay, error = %last_error, "retrying");
                tokio::time::sleep(delay).await;
            }

            let result = self
                .client
                .get(url)
                .header("User-Agent", USER_AGENT)
                .timeout(self.retry.timeout)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !RetryPolicy::is_retryable_status(status) {
                        return Err(FetchError::Status {
                            url: url.to_owned(),
                            status,
                        });
                    }
                    last_error = format!("HTTP {status}");
                }
                Err(e) if e.is_builder() => return Err(FetchError::InvalidUrl(url.to_owned())),
                Err(e) if e.is_timeout() => {
                    last_error = format!("timed out after {:?}", self.retry.timeout);
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_owned(),
            attempts,
            message: last_error,
        })
    }

    async fn body(url: &str, response: reqwest::Response) -> Result<String, FetchError> {
        response.text().await.map_err(|e| FetchError::Network {
            url: url.to_owned(),
            message: format!("failed to read body: {e}"),
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        tracing::debug!(url, "fetching");
        let response = self.get(url).await?;

        if !is_html(&response) {
            return Self::body(url, response).await.map(Some);
        }

        let Some(raw) = raw_download_url(url, &response)? else {
            return Ok(None);
        };
        tracing::debug!(url, raw = %raw, "following raw download");
        let raw_response = self.get(&raw).await?;
        Self::body(&raw, raw_response).await.map(Some)
    }
}

fn is_html(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/html"))
}

/// The advertised raw location, resolved against the page URL.
fn raw_download_url(
    page_url: &str,
    response: &reqwest::Response,
) -> Result<Option<String>, FetchError> {
    let Some(value) = response.headers().get(RAW_DOWNLOAD_HEADER) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| FetchError::InvalidUrl(format!("{RAW_DOWNLOAD_HEADER} on {page_url}")))?
        .trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let resolved = reqwest::Url::parse(page_url)
        .and_then(|base| base.join(raw))
        .map_err(|_| FetchError::InvalidUrl(raw.to_owned()))?;
    Ok(Some(resolved.into()))
}
