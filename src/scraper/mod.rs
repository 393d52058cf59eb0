//! Scraper module for fetching remote documents
//!
//! This module provides the HTTP client every pipeline fetches through. One
//! call issues exactly one request: no retries, no delays, no backoff.

use rand::Rng;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::pipeline::manga::QueryError;

/// Errors that can occur during scraping operations
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Network-related errors (connection timeout, DNS failure, etc.)
    #[error("Failed to connect to server: {0}")]
    NetworkError(String),

    /// HTTP non-2xx status code errors
    #[error("Server returned status {0}")]
    HttpError(u16),

    /// Error reading or decoding the response body
    #[error("Failed to read response body: {0}")]
    ResponseError(String),

    /// The upstream answered but broke its contract (e.g. `result != "ok"`)
    #[error("Upstream contract violation: {0}")]
    UpstreamError(String),

    /// A value the extraction indexes into was not present
    #[error("Missing {field} in {context:?}")]
    ExtractionMiss {
        field: &'static str,
        context: String,
    },

    /// A selector in a rule set failed to parse
    #[error("Invalid selector `{0}`")]
    InvalidSelector(String),

    /// Caller-supplied parameters out of bounds
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
}

impl ScraperError {
    /// Build an extraction miss for `field`, keeping the offending text
    pub fn missing(field: &'static str, context: impl Into<String>) -> Self {
        ScraperError::ExtractionMiss {
            field,
            context: context.into(),
        }
    }
}

/// A single outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    /// Url-encoded form body, only sent with POST
    pub form: Option<Vec<(String, String)>>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            form: None,
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            form: Some(form),
        }
    }
}

/// Result of a successful page fetch
///
/// The body is handed to the `parser` functions as-is; html5ever never fails,
/// so malformed markup degrades to a sparse or empty tree.
#[derive(Debug)]
pub struct Page {
    /// The URL that was requested, for resolving relative links
    pub url: String,
    /// The raw response body
    pub body: String,
}

/// List of realistic user agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_JSON: &str = "application/json";

/// HTTP client shared by all pipelines
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the given total request timeout
    pub fn new(timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ScraperError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn user_agent(&self) -> &'static str {
        USER_AGENTS[rand::thread_rng().gen_range(0..USER_AGENTS.len())]
    }

    /// Fetch an HTML page
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Page, ScraperError> {
        let response = self.send(request, ACCEPT_HTML).await?;

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::ResponseError(e.to_string()))?;

        Ok(Page {
            url: request.url.clone(),
            body,
        })
    }

    /// GET a JSON document and decode it into `T`
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScraperError> {
        let response = self.send(&FetchRequest::get(url), ACCEPT_JSON).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ScraperError::ResponseError(e.to_string()))
    }

    async fn send(
        &self,
        request: &FetchRequest,
        accept: &str,
    ) -> Result<reqwest::Response, ScraperError> {
        tracing::debug!(method = %request.method, url = %request.url, "Fetching");

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header("User-Agent", self.user_agent())
            .header("Accept", accept)
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache");

        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ScraperError::NetworkError("Connection timeout".to_string())
            } else if e.is_connect() {
                ScraperError::NetworkError("Failed to connect to server".to_string())
            } else {
                ScraperError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %request.url, status = status.as_u16(), "Upstream returned error status");
            return Err(ScraperError::HttpError(status.as_u16()));
        }

        Ok(response)
    }
}
