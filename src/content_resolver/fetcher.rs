use std::time::Duration;

use reqwest::{Client, StatusCode, header::ACCEPT};
use serde_json::Value;
use thiserror::Error;

/// Default timeout of a single content fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Why a content fetch produced no payload.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// The body was not valid JSON.
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Retrieves the JSON document stored at an address.
///
/// One call is one request: implementations do not retry, so per-message latency stays bounded
/// by the request timeout.
pub trait ContentFetcher: Send + Sync {
    /// Fetches and parses the JSON body at `address`.
    fn fetch_json(&self, address: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// [`ContentFetcher`] over HTTP(S) with a per-request timeout.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, keeping its configuration.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ContentFetcher for HttpFetcher {
    async fn fetch_json(&self, address: &str) -> Result<Value, FetchError> {
        let response = self.client.get(address).header(ACCEPT, "application/json").send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::get};
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Serves `router` on a random local port and returns the URL of one content path on it.
    async fn serve(router: Router) -> anyhow::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, router).await });

        Ok(format!("http://{addr}/ipfs/bafybeigabc"))
    }

    #[tokio::test]
    async fn parses_json_body() -> anyhow::Result<()> {
        let router = Router::new()
            .route("/ipfs/{cid}", get(|| async { Json(json!({ "text": "hello" })) }));
        let url = serve(router).await?;
        let fetcher = HttpFetcher::new(Duration::from_secs(5))?;

        let value = fetcher.fetch_json(&url).await?;

        assert_eq!(value["text"], "hello");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() -> anyhow::Result<()> {
        let router = Router::new().route("/ipfs/{cid}", get(|| async { StatusCode::NOT_FOUND }));
        let url = serve(router).await?;
        let fetcher = HttpFetcher::new(Duration::from_secs(5))?;

        let err = fetcher.fetch_json(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Status(StatusCode::NOT_FOUND)));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() -> anyhow::Result<()> {
        let router = Router::new().route("/ipfs/{cid}", get(|| async { "not json" }));
        let url = serve(router).await?;
        let fetcher = HttpFetcher::new(Duration::from_secs(5))?;

        let err = fetcher.fetch_json(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);
        let fetcher = HttpFetcher::new(Duration::from_secs(5))?;

        let err = fetcher.fetch_json(&format!("http://{addr}/ipfs/x")).await.unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
        Ok(())
    }
}
