use async_trait::async_trait;
use scraper::Html;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Source of page markup. The pipeline only ever sees this trait, so tests
/// can serve pages from memory.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_html(&self, url: &Url) -> Result<String, FetchError>;
}

/// Plain HTTP GET with client defaults: no custom headers, cookies or timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_html(&self, url: &Url) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}

/// Fetch a page and return its text content with all markup discarded.
pub async fn fetch_text<F: Fetch + ?Sized>(fetcher: &F, url: &Url) -> Result<String, FetchError> {
    let html = fetcher.fetch_html(url).await?;
    Ok(html_to_text(&html))
}

/// Concatenate every text node in the document, whitespace untouched.
pub fn html_to_text(html: &str) -> String {
    Html::parse_document(html).root_element().text().collect()
}
