//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with user agent and timeouts
//! - GET requests for pages and link verification
//! - Classifying the outcome as success, not-found, or network error
//!
//! There is no retry: every URL is requested exactly once per verification.

use crate::config::Config;
use crate::output::LinkFailure;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// A page that answered with something other than not-found
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    /// Page body; only read when requested and the content is HTML
    pub body: Option<String>,
}

impl FetchedPage {
    /// Returns true for 4xx/5xx statuses other than not-found
    pub fn is_error_status(&self) -> bool {
        self.status_code >= 400
    }
}

/// Result of fetching one URL
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// Any response other than not-found
    Success(FetchedPage),

    /// The server answered 404
    NotFound { status_code: u16 },

    /// Transport or protocol failure; first line of the error only
    NetworkError { message: String },
}

impl PageOutcome {
    /// Splits the outcome into the fetched page or the failure to record
    pub fn into_page(self) -> Result<FetchedPage, LinkFailure> {
        match self {
            Self::Success(page) => Ok(page),
            Self::NotFound { status_code } => Err(LinkFailure::NotFound { status_code }),
            Self::NetworkError { message } => Err(LinkFailure::Network { message }),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use linksweep::config::Config;
/// use linksweep::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.user_agent_string())
        .timeout(Duration::from_secs(config.crawler.request_timeout))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | HTTP 404 | `NotFound` |
/// | Any other status | `Success` |
/// | Connection, TLS, timeout, redirect, or body read error | `NetworkError` |
///
/// The body is only read when `want_body` is set and the response is HTML
/// (or declares no Content-Type).
pub async fn fetch_url(client: &Client, url: &Url, want_body: bool) -> PageOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Request to {} failed: {}", url, e);
            return PageOutcome::NetworkError {
                message: first_line(&e.to_string()),
            };
        }
    };

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return PageOutcome::NotFound {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let wants_html = content_type
        .as_deref()
        .map_or(true, |ct| ct.to_ascii_lowercase().contains("html"));

    let body = if want_body && wants_html {
        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                return PageOutcome::NetworkError {
                    message: first_line(&e.to_string()),
                }
            }
        }
    } else {
        None
    };

    PageOutcome::Success(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}

/// Keeps only the first line of an error description
pub fn first_line(message: &str) -> String {
    let line = message.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        "unknown network error".to_string()
    } else {
        line.to_string()
    }
}
