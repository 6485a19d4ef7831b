//! Resolution of content pointers to the JSON payloads they reference.
//!
//! A pointer is first normalized to one fetchable address (see [`ContentPointer::normalize`]),
//! then fetched once. Failures never propagate: a pointer that cannot be resolved produces a
//! [`ResolvedContent`] without a payload, so the message it belongs to is kept and can still be
//! ordered and displayed.

mod fetcher;
mod payload;
mod pointer;

pub use fetcher::{ContentFetcher, DEFAULT_FETCH_TIMEOUT, FetchError, HttpFetcher};
pub use payload::extract_text;
pub use pointer::{ContentPointer, Gateway, POINTER_KEYS};

use std::time::Duration;

use futures::{StreamExt, stream};
use serde_json::Value;

use crate::ScannerError;

/// Default gateway used to turn content identifiers into fetchable addresses.
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud";

/// Outcome of resolving one pointer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedContent {
    /// The fetched JSON document, `None` if the fetch failed or nothing was fetched.
    pub raw: Option<Value>,
    /// The address the pointer normalized to, `None` if it named nothing.
    pub resolved_address: Option<String>,
}

/// Builder/configuration for a [`ContentResolver`].
#[derive(Clone, Debug)]
pub struct ContentResolverBuilder {
    pub gateway: String,
    pub fetch_timeout: Duration,
}

impl Default for ContentResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentResolverBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { gateway: DEFAULT_GATEWAY.to_owned(), fetch_timeout: DEFAULT_FETCH_TIMEOUT }
    }

    /// Sets the gateway base URL, e.g. `https://ipfs.io`.
    #[must_use]
    pub fn gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    /// Sets the timeout of a single content fetch. Only used by [`Self::build`].
    #[must_use]
    pub fn fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Builds a resolver fetching over HTTP.
    ///
    /// # Errors
    ///
    /// * [`ScannerError::InvalidGateway`] - if the gateway is not an absolute http(s) URL.
    /// * [`ScannerError::HttpClient`] - if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<ContentResolver<HttpFetcher>, ScannerError> {
        let fetcher = HttpFetcher::new(self.fetch_timeout)
            .map_err(|e| ScannerError::HttpClient(e.to_string()))?;
        self.build_with(fetcher)
    }

    /// Builds a resolver around a custom fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerError::InvalidGateway`] if the gateway is not an absolute http(s) URL.
    pub fn build_with<F: ContentFetcher>(
        self,
        fetcher: F,
    ) -> Result<ContentResolver<F>, ScannerError> {
        let gateway = Gateway::parse(&self.gateway)?;
        Ok(ContentResolver { gateway, fetcher })
    }
}

/// Normalizes content pointers and fetches what they reference.
#[derive(Clone, Debug)]
pub struct ContentResolver<F> {
    gateway: Gateway,
    fetcher: F,
}

impl<F: ContentFetcher> ContentResolver<F> {
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Resolves the pointer string logged with a message.
    pub async fn resolve(&self, pointer: &str) -> ResolvedContent {
        match ContentPointer::parse(pointer) {
            Some(pointer) => self.resolve_pointer(&pointer).await,
            None => ResolvedContent::default(),
        }
    }

    /// Resolves an already parsed pointer.
    pub async fn resolve_pointer(&self, pointer: &ContentPointer) -> ResolvedContent {
        let Some(address) = pointer.normalize(&self.gateway) else {
            debug!(pointer = ?pointer, "Content pointer names no address");
            return ResolvedContent::default();
        };

        match self.fetcher.fetch_json(&address).await {
            Ok(raw) => {
                trace!(address = %address, "Fetched content");
                ResolvedContent { raw: Some(raw), resolved_address: Some(address) }
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Content fetch failed, keeping message without payload");
                ResolvedContent { raw: None, resolved_address: Some(address) }
            }
        }
    }

    /// Resolves many pointers with at most `max_concurrent_fetches` requests in flight.
    ///
    /// The output has one entry per input pointer, in input order, whatever order the fetches
    /// complete in. A limit of 1 resolves strictly sequentially.
    pub async fn resolve_all<'a, I>(
        &self,
        pointers: I,
        max_concurrent_fetches: usize,
    ) -> Vec<ResolvedContent>
    where
        I: IntoIterator<Item = &'a str>,
    {
        stream::iter(pointers)
            .map(|pointer| self.resolve(pointer))
            .buffered(max_concurrent_fetches.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockFetcher;
    use serde_json::json;

    const ADDRESS: &str = "https://gw.example/ipfs/bafybeigabc";

    fn resolver(fetcher: MockFetcher) -> ContentResolver<MockFetcher> {
        ContentResolverBuilder::new().gateway("https://gw.example").build_with(fetcher).unwrap()
    }

    #[test]
    fn builder_defaults_match_constants() {
        let builder = ContentResolverBuilder::new();

        assert_eq!(builder.gateway, DEFAULT_GATEWAY);
        assert_eq!(builder.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn builder_rejects_invalid_gateway() {
        let result = ContentResolverBuilder::new().gateway("gw.example").build_with(MockFetcher::new());

        assert!(matches!(result, Err(ScannerError::InvalidGateway(_))));
    }

    #[tokio::test]
    async fn resolves_payload_of_each_shape() {
        let fetcher = MockFetcher::new().with(ADDRESS, json!({ "text": "hi" }));
        let resolver = resolver(fetcher.clone());

        for pointer in [
            "ipfs://bafybeigabc",
            ADDRESS,
            "bafybeigabc",
            r#"{"gatewayUrl":"https://gw.example/ipfs/bafybeigabc"}"#,
        ] {
            let resolved = resolver.resolve(pointer).await;
            assert_eq!(resolved.raw, Some(json!({ "text": "hi" })), "pointer {pointer}");
            assert_eq!(resolved.resolved_address.as_deref(), Some(ADDRESS));
        }
        assert_eq!(fetcher.requests().len(), 4);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_address_and_drops_payload() {
        let resolver = resolver(MockFetcher::new().failing(ADDRESS));

        let resolved = resolver.resolve("bafybeigabc").await;

        assert_eq!(resolved.raw, None);
        assert_eq!(resolved.resolved_address.as_deref(), Some(ADDRESS));
    }

    #[tokio::test]
    async fn empty_pointer_is_not_fetched() {
        let fetcher = MockFetcher::new();
        let resolver = resolver(fetcher.clone());

        assert_eq!(resolver.resolve("").await, ResolvedContent::default());
        assert_eq!(resolver.resolve(r#"{"cid":""}"#).await, ResolvedContent::default());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn resolve_all_preserves_input_order() {
        let fetcher = MockFetcher::new()
            .with("https://gw.example/ipfs/a", json!({ "text": "a" }))
            .with("https://gw.example/ipfs/c", json!({ "text": "c" }))
            .failing("https://gw.example/ipfs/b");
        let resolver = resolver(fetcher);

        for concurrency in [1, 3] {
            let resolved = resolver.resolve_all(["a", "b", "c"], concurrency).await;

            let texts: Vec<_> =
                resolved.iter().map(|r| r.raw.as_ref().and_then(extract_text)).collect();
            assert_eq!(texts, vec![Some("a"), None, Some("c")]);
        }
    }
}
