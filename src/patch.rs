//! Downloading PR patches.
//!
//! The patch endpoint serves the raw `.patch` for a pull request; the
//! bytes are later piped into `git am -3`. Behind a trait so the merge
//! workflow can be tested without network access.

use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// Fetches a PR patch by URL.
#[async_trait]
pub trait PatchSource: Send + Sync {
    /// Download the patch bytes.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Production [`PatchSource`] backed by `reqwest`.
///
/// Follows redirects (the patch host redirects for some repositories).
#[derive(Debug, Clone, Default)]
pub struct HttpPatchSource {
    client: reqwest::Client,
}

impl HttpPatchSource {
    /// Create a new HTTP patch source.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatchSource for HttpPatchSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "fetching patch");
        let fetch_err = |source| Error::PatchFetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?;
        let bytes = response.bytes().await.map_err(fetch_err)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_body_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/raw/foo/bar/pull/42.patch")
            .with_status(200)
            .with_body("From abc123 Mon Sep 17 00:00:00 2001\n")
            .create_async()
            .await;

        let url = format!("{}/raw/foo/bar/pull/42.patch", server.url());
        let bytes = HttpPatchSource::new().fetch(&url).await.unwrap();

        assert!(bytes.starts_with(b"From abc123"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_404_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/raw/foo/bar/pull/42.patch")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/raw/foo/bar/pull/42.patch", server.url());
        let err = HttpPatchSource::new().fetch(&url).await.unwrap_err();

        match err {
            Error::PatchFetch { url: failed, .. } => assert!(failed.contains("/pull/42.patch")),
            other => panic!("expected PatchFetch, got: {other:?}"),
        }
    }
}
