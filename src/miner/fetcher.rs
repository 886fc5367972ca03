//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the miner, including:
//! - Building the HTTP client with browser-like headers
//! - GET requests for detail pages and form POSTs for search pages
//! - Retry with exponential backoff for failed requests
//! - Error classification

use crate::config::{RetryConfig, SiteConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
                           image/avif,image/webp,image/apng,*/*;q=0.8,\
                           application/signed-exchange;v=b3;q=0.7";

/// A request the miner sends to the site
#[derive(Debug, Clone)]
pub enum PageRequest {
    /// Plain GET of a page
    Get { url: String },

    /// Form-encoded POST, sent with the Origin and Referer a browser would add
    PostForm {
        url: String,
        form: Vec<(&'static str, String)>,
        origin: String,
        referer: String,
    },
}

impl PageRequest {
    pub fn url(&self) -> &str {
        match self {
            Self::Get { url } | Self::PostForm { url, .. } => url,
        }
    }
}

/// Result of a single fetch attempt
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered 200 OK
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// The server answered with any other status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, TLS, body decoding, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// A page body that was fetched successfully
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// Certificate verification follows `site.verify_tls`. It is off by default
/// because the target site's chain does not always validate; turning it off
/// against any other host weakens the trust boundary, so it is logged.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use phonedb_miner::config::SiteConfig;
/// use phonedb_miner::miner::build_http_client;
///
/// let client = build_http_client(&SiteConfig::default()).unwrap();
/// ```
pub fn build_http_client(site: &SiteConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    match HeaderValue::from_str(&site.accept_language) {
        Ok(value) => {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        Err(_) => tracing::warn!(
            "Ignoring invalid accept-language header value: {:?}",
            site.accept_language
        ),
    }

    if !site.verify_tls {
        tracing::warn!("TLS certificate verification is disabled for all requests");
    }

    Client::builder()
        .user_agent(site.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(site.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(!site.verify_tls)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a request once and classifies the outcome
///
/// Anything but `200 OK` is an [`FetchResult::HttpError`]; transport failures
/// and unreadable bodies are [`FetchResult::NetworkError`].
pub async fn fetch_once(client: &Client, request: &PageRequest) -> FetchResult {
    let builder = match request {
        PageRequest::Get { url } => client.get(url),
        PageRequest::PostForm {
            url,
            form,
            origin,
            referer,
        } => client
            .post(url)
            .header(ORIGIN, origin.as_str())
            .header(REFERER, referer.as_str())
            .form(form),
    };

    match builder.send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if status != StatusCode::OK {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success { final_url, body },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            FetchResult::NetworkError { error }
        }
    }
}

/// Fetches a page, retrying failed attempts with exponential backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200 | Return the page |
/// | Any other status | Retry |
/// | Network / TLS / timeout error | Retry |
///
/// After failed attempt `n` the fetcher sleeps `base_delay * 2^(n-1)` before
/// trying again, up to `max_attempts` attempts in total.
///
/// # Returns
///
/// * `Some(FetchedPage)` - The page was fetched
/// * `None` - Every attempt failed; the caller treats the request as not having happened
pub async fn fetch_with_retry(
    client: &Client,
    request: &PageRequest,
    retry: &RetryConfig,
) -> Option<FetchedPage> {
    let max_attempts = retry.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match fetch_once(client, request).await {
            FetchResult::Success { final_url, body } => {
                return Some(FetchedPage { final_url, body });
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!(
                    "Request to {} failed with status code {} (attempt {}/{})",
                    request.url(),
                    status_code,
                    attempt,
                    max_attempts
                );
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!(
                    "Request to {} failed with error: {} (attempt {}/{})",
                    request.url(),
                    error,
                    attempt,
                    max_attempts
                );
            }
        }

        if attempt < max_attempts {
            let delay = retry.backoff_for(attempt);
            tracing::debug!("Retrying {} in {:?}", request.url(), delay);
            tokio::time::sleep(delay).await;
        }
    }

    tracing::warn!(
        "Giving up on {} after {} attempts",
        request.url(),
        max_attempts
    );
    None
}
