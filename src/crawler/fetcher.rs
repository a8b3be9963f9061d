//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with browser-like default headers
//! - Following redirects manually so the redirect chain stays visible
//! - Recomputing the Host header for every hop
//! - Classifying transport failures

use crate::state::FailureKind;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, HOST, LOCATION};
use reqwest::{redirect::Policy, Client, Response};
use std::collections::BTreeMap;
use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// User agent sent when the configuration does not override it
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

/// Maximum number of redirect hops followed for a single request
pub const MAX_REDIRECTS: usize = 10;

/// Shared outbound request configuration
#[derive(Debug, Clone)]
pub struct RequestSettings {
    /// Whether TLS certificates must verify
    pub verify_tls: bool,
    /// Overrides [`DEFAULT_USER_AGENT`]
    pub user_agent: Option<String>,
    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl RequestSettings {
    /// Settings with the default browser identity
    pub fn new(verify_tls: bool) -> Self {
        Self {
            verify_tls,
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }
}

/// One redirect response on the way to the final URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    /// URL that answered with a redirect
    pub url: String,
    /// Redirect status code
    pub status_code: u16,
}

/// A response reached after following every redirect
#[derive(Debug)]
pub struct FollowedResponse {
    /// Status code of the last response
    pub status_code: u16,
    /// URL of the last response
    pub final_url: String,
    /// Redirects followed, first hop first
    pub redirects: Vec<RedirectHop>,
    /// The last response, body unread
    pub response: Response,
}

impl FollowedResponse {
    /// Returns true if at least one redirect was followed
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Failure to obtain any response for a URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Too many redirects from {url}")]
    TooManyRedirects { url: String },
}

impl FetchError {
    /// Maps the failure onto the closed set of transport failure kinds
    ///
    /// Returns `None` for failures the classification has no entry for.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::InvalidUrl { .. } => Some(FailureKind::InvalidUrl),
            Self::Transport { source, .. } => classify_transport_error(source),
            Self::TooManyRedirects { .. } => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are disabled on the client; [`follow_redirects`] walks them so
/// that the first hop's status code can be classified.
pub fn build_http_client(
    settings: &RequestSettings,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let user_agent = settings
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Client::builder()
        .user_agent(user_agent)
        .default_headers(default_headers(settings))
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none())
        .danger_accept_invalid_certs(!settings.verify_tls)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Browser-like headers plus the configured extras
fn default_headers(settings: &RequestSettings) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    for (name, value) in &settings.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header '{}'", name),
        }
    }

    headers
}

/// Computes the Host header value for a URL: host, plus the port when explicit
pub fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Issues a GET and follows redirects manually (max [`MAX_REDIRECTS`] hops)
///
/// Every hop carries a Host header computed from that hop's own URL.
/// A 3xx response without a Location header is returned as the final
/// response.
pub async fn follow_redirects(client: &Client, url: &str) -> Result<FollowedResponse, FetchError> {
    let mut current = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let mut redirects = Vec::new();

    loop {
        let mut request = client.get(current.clone());
        if let Some(host) = host_header(&current) {
            request = request.header(HOST, host);
        }

        let response = request.send().await.map_err(|source| FetchError::Transport {
            url: current.to_string(),
            source,
        })?;
        let status = response.status();

        if status.is_redirection() {
            if let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
            {
                let next = current.join(location).map_err(|e| FetchError::InvalidUrl {
                    url: location.to_string(),
                    reason: e.to_string(),
                })?;

                redirects.push(RedirectHop {
                    url: current.to_string(),
                    status_code: status.as_u16(),
                });
                if redirects.len() > MAX_REDIRECTS {
                    return Err(FetchError::TooManyRedirects {
                        url: url.to_string(),
                    });
                }

                tracing::trace!("{} redirected to {}", current, next);
                current = next;
                continue;
            }
        }

        return Ok(FollowedResponse {
            status_code: status.as_u16(),
            final_url: current.to_string(),
            redirects,
            response,
        });
    }
}

/// Fetches a page body, returning the final status code and the text
pub async fn fetch_page(client: &Client, url: &str) -> Result<(u16, String), FetchError> {
    let followed = follow_redirects(client, url).await?;
    let status_code = followed.status_code;
    let body = followed
        .response
        .text()
        .await
        .map_err(|source| FetchError::Transport {
            url: followed.final_url.clone(),
            source,
        })?;
    Ok((status_code, body))
}

/// Maps a reqwest error onto the closed set of transport failure kinds
pub fn classify_transport_error(error: &reqwest::Error) -> Option<FailureKind> {
    if error.is_builder() {
        Some(FailureKind::InvalidUrl)
    } else if error.is_timeout() {
        if error.is_connect() {
            Some(FailureKind::ConnectTimeout)
        } else {
            Some(FailureKind::ReadTimeout)
        }
    } else if error.is_connect() {
        if is_tls_error(error) {
            Some(FailureKind::Tls)
        } else {
            Some(FailureKind::Connect)
        }
    } else if error.is_body() || error.is_decode() {
        Some(FailureKind::UnreadableResponse)
    } else if error.is_request() {
        Some(FailureKind::Connect)
    } else {
        None
    }
}

/// TLS failures surface as connect errors; the source chain names them
fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string().to_lowercase();
        if message.contains("certificate")
            || message.contains("tls")
            || message.contains("ssl")
            || message.contains("handshake")
        {
            return true;
        }
        source = cause.source();
    }
    false
}
