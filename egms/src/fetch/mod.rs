//! Tile archive retrieval.
//!
//! [`TileFetcher`] issues exactly one GET per [`RequestIdentity`] and maps
//! the transport result into a typed [`FetchError`]. It never retries and
//! keeps no cache; pacing between requests belongs to the batch layer.

mod http;

use thiserror::Error;
use tracing::debug;

use crate::identity::RequestIdentity;

pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};

#[cfg(test)]
pub use http::tests::{MockHttpClient, RoutedHttpClient};

/// Why a tile archive could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response was received (connection refused, DNS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status code.
    #[error("HTTP status {0}")]
    Status(u16),
}

/// Retrieves raw tile archives over HTTP.
pub struct TileFetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> TileFetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetches the archive bytes for `identity`.
    pub fn fetch(&self, identity: &RequestIdentity) -> Result<Vec<u8>, FetchError> {
        debug!(tile = identity.label(), "Requesting tile archive");

        let bytes = self.client.get(identity.locator())?;

        debug!(
            tile = identity.label(),
            bytes = bytes.len(),
            "Tile archive received"
        );
        Ok(bytes)
    }

    /// Underlying HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }
}
