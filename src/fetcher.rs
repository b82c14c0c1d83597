//! Remote lookup of the server address.
//!
//! [`HttpAddressFetcher`] performs exactly one bounded-time GET against the
//! lookup endpoint and extracts the `address` field from the JSON body.
//! It keeps no state and never retries; retry policy belongs to the caller.

use std::time::Duration;

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::transport::{HttpClient, HttpError, HttpRequest};

#[cfg(test)]
#[path = "fetcher_tests.rs"]
mod tests;

/// Header identifying the client build on every lookup request.
pub const VERSION_HEADER: HeaderName = HeaderName::from_static("x-ext-version");

/// Error type for address lookups.
///
/// Every variant is non-fatal: callers fall back to the last-known address.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint answered with a non-2xx status.
    #[error("Lookup endpoint returned HTTP {0}")]
    BadStatus(http::StatusCode),

    /// The body was not JSON, or its `address` field was missing, empty or not a string.
    #[error("Invalid address payload")]
    InvalidPayload,

    /// No response within the lookup timeout.
    #[error("Address lookup timed out")]
    Timeout,

    /// Any other transport failure.
    #[error("Transport error: {0}")]
    Transport(#[source] HttpError),
}

impl From<HttpError> for FetchError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Timeout => Self::Timeout,
            other => Self::Transport(other),
        }
    }
}

/// Trait for obtaining a candidate server address.
///
/// Implemented by [`HttpAddressFetcher`] in production and by mocks in tests.
pub trait AddressFetcher: Send + Sync {
    /// Performs one lookup.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when:
    /// - The endpoint answers with a non-success status ([`FetchError::BadStatus`])
    /// - The body carries no usable address ([`FetchError::InvalidPayload`])
    /// - The lookup exceeds its timeout ([`FetchError::Timeout`])
    /// - The transport fails otherwise ([`FetchError::Transport`])
    fn fetch(&self) -> impl std::future::Future<Output = Result<String, FetchError>> + Send;
}

/// A missing fetcher stands for "no lookup endpoint configured".
///
/// Every lookup fails with [`HttpError::InvalidUrl`] wrapped in
/// [`FetchError::Transport`].
impl<F: AddressFetcher> AddressFetcher for Option<F> {
    async fn fetch(&self) -> Result<String, FetchError> {
        match self {
            Some(fetcher) => fetcher.fetch().await,
            None => Err(FetchError::Transport(HttpError::InvalidUrl(
                "no lookup URL configured".to_string(),
            ))),
        }
    }
}

/// Expected shape of the lookup response. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    address: String,
}

/// Looks up the server address over HTTP.
///
/// # Example
///
/// ```
/// use dynaddr::fetcher::HttpAddressFetcher;
/// use dynaddr::transport::ReqwestClient;
/// use url::Url;
///
/// let fetcher = HttpAddressFetcher::new(
///     ReqwestClient::new(),
///     Url::parse("https://lookup.example.com/address").unwrap(),
///     "1.2.3",
/// );
/// assert_eq!(fetcher.timeout(), HttpAddressFetcher::<ReqwestClient>::TIMEOUT);
/// ```
#[derive(Debug)]
pub struct HttpAddressFetcher<H> {
    client: H,
    url: Url,
    client_version: String,
    timeout: Duration,
}

impl<H> HttpAddressFetcher<H> {
    /// Fixed lookup timeout.
    pub const TIMEOUT: Duration = Duration::from_millis(5000);

    /// Creates a fetcher for `url`, sending `client_version` in the version header.
    #[must_use]
    pub fn new(client: H, url: Url, client_version: impl Into<String>) -> Self {
        Self {
            client,
            url,
            client_version: client_version.into(),
            timeout: Self::TIMEOUT,
        }
    }

    /// Returns the lookup endpoint.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the lookup timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_request(&self) -> HttpRequest {
        let mut request = HttpRequest::get(self.url.clone())
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // A version string that is not a valid header value is left out rather
        // than failing the lookup.
        match HeaderValue::from_str(&self.client_version) {
            Ok(value) => request = request.with_header(VERSION_HEADER, value),
            Err(e) => tracing::warn!("Client version not sent: {e}"),
        }

        request
    }
}

impl<H: HttpClient> AddressFetcher for HttpAddressFetcher<H> {
    async fn fetch(&self) -> Result<String, FetchError> {
        let request = self.build_request();

        // Elapsing drops the request future, which aborts the in-flight call.
        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| FetchError::Timeout)??;

        if !response.is_success() {
            return Err(FetchError::BadStatus(response.status));
        }

        parse_address(&response.body)
    }
}

/// Extracts a non-empty `address` string from a JSON body.
fn parse_address(body: &[u8]) -> Result<String, FetchError> {
    let payload: LookupResponse = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Unparseable lookup payload: {e}");
        FetchError::InvalidPayload
    })?;

    if payload.address.is_empty() {
        return Err(FetchError::InvalidPayload);
    }

    Ok(payload.address)
}
