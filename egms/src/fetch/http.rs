//! HTTP client abstraction for testability

use std::time::Duration;

use super::FetchError;

/// Default request timeout in seconds.
///
/// The archive service assembles tile archives on demand and can take
/// several minutes for large tiles.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3000;

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes, [`FetchError::Status`] for a non-2xx
    /// response, or [`FetchError::Transport`] if no response was received.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<C: HttpClient + ?Sized> HttpClient for Box<C> {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).get(url)
    }
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default (long) timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("egms/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        // Error text must not echo the URL: it carries the access token
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Transport(format!("timed out after {}s", self.timeout.as_secs()))
            } else {
                FetchError::Transport(e.without_url().to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| {
                FetchError::Transport(format!("Failed to read response: {}", e.without_url()))
            })
    }
}
