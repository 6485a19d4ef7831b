use std::time::Duration;

use alloy::{network::Network, primitives::Address};

use crate::{
    LedgerClient, ScannerError,
    content_resolver::{ContentFetcher, ContentResolverBuilder, Gateway, HttpFetcher},
    range_scanner::RangeScannerBuilder,
    robust_provider::{IntoRootProvider, RobustProvider, RobustProviderBuilder},
    transcript::TranscriptScanner,
};

/// Default number of content fetches in flight per transcript.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 1;

/// Configures a [`TranscriptScanner`].
///
/// # Example
///
/// ```no_run
/// # use alloy::primitives::address;
/// # use transcript_scanner::{ChatSessionId, TranscriptScannerBuilder};
/// #
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let scanner = TranscriptScannerBuilder::new(address!("0x00000000000000000000000000000000000c4a77"))
///     .lookback(50_000)
///     .gateway("https://ipfs.io")
///     .max_concurrent_fetches(8)
///     .connect::<alloy::network::Ethereum>("http://localhost:8545")
///     .await?;
///
/// for message in scanner.fetch_transcript(ChatSessionId::from(42u64)).await? {
///     println!("{}: {}", message.sender_hex(), message.display_text());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TranscriptScannerBuilder {
    pub(crate) contract_address: Address,
    pub(crate) range_scanner: RangeScannerBuilder,
    pub(crate) content_resolver: ContentResolverBuilder,
    pub(crate) max_concurrent_fetches: usize,
}

impl TranscriptScannerBuilder {
    /// Starts a builder for transcripts of the chat contract at `contract_address`.
    #[must_use]
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            range_scanner: RangeScannerBuilder::new(),
            content_resolver: ContentResolverBuilder::new(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    #[must_use]
    pub fn contract_address(mut self, contract_address: Address) -> Self {
        self.contract_address = contract_address;
        self
    }

    /// Number of blocks below the head a transcript reaches back.
    #[must_use]
    pub fn lookback(mut self, lookback: u64) -> Self {
        self.range_scanner = self.range_scanner.lookback(lookback);
        self
    }

    /// Largest number of blocks covered by one log query. Must be greater than 0.
    #[must_use]
    pub fn max_block_range(mut self, max_block_range: u64) -> Self {
        self.range_scanner = self.range_scanner.max_block_range(max_block_range);
        self
    }

    /// Gateway turning content identifiers into fetchable addresses.
    #[must_use]
    pub fn gateway(mut self, gateway: impl Into<String>) -> Self {
        self.content_resolver = self.content_resolver.gateway(gateway);
        self
    }

    /// Timeout of a single content fetch. Ignored by [`Self::build_with`].
    #[must_use]
    pub fn fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.content_resolver = self.content_resolver.fetch_timeout(fetch_timeout);
        self
    }

    /// Controls how many content fetches can run in parallel. Must be greater than 0.
    #[must_use]
    pub fn max_concurrent_fetches(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches;
        self
    }

    /// Connects to a ledger node and fetches content over HTTP.
    ///
    /// The configuration is validated before any connection is attempted. The ledger client is
    /// built with [`RobustProviderBuilder::fragile`]: a failed log query goes straight back to the
    /// range scanner, which halves the window instead of waiting out backoff retries. Use
    /// [`Self::build_with`] to scan through a provider with retries or fallbacks.
    ///
    /// # Errors
    ///
    /// * [`ScannerError::InvalidMaxBlockRange`] - if `max_block_range` is 0.
    /// * [`ScannerError::InvalidMaxConcurrentFetches`] - if `max_concurrent_fetches` is 0.
    /// * [`ScannerError::InvalidGateway`] - if the gateway is not an absolute http(s) URL.
    /// * [`ScannerError::HttpClient`] - if the HTTP client cannot be initialized.
    /// * [`ScannerError::RpcError`] - if the provider fails to connect.
    pub async fn connect<N: Network>(
        self,
        provider: impl IntoRootProvider<N>,
    ) -> Result<TranscriptScanner<RobustProvider<N>, HttpFetcher>, ScannerError> {
        self.validate()?;
        let fetcher = HttpFetcher::new(self.content_resolver.fetch_timeout)
            .map_err(|e| ScannerError::HttpClient(e.to_string()))?;
        let ledger = match RobustProviderBuilder::fragile(provider).build().await {
            Ok(ledger) => ledger,
            Err(e) => {
                error!(error = %e, "Failed to connect ledger provider");
                return Err(e.into());
            }
        };
        self.build_with(ledger, fetcher)
    }

    /// Builds a scanner around an existing ledger client and content fetcher.
    ///
    /// This is the way to use a [`RobustProvider`] with custom retry or fallback settings.
    ///
    /// # Errors
    ///
    /// Same configuration errors as [`Self::connect`].
    pub fn build_with<L: LedgerClient, F: ContentFetcher>(
        self,
        ledger: L,
        fetcher: F,
    ) -> Result<TranscriptScanner<L, F>, ScannerError> {
        self.validate()?;
        let range_scanner = self.range_scanner.build()?;
        let resolver = self.content_resolver.build_with(fetcher)?;

        Ok(TranscriptScanner::new(
            self.contract_address,
            ledger,
            range_scanner,
            resolver,
            self.max_concurrent_fetches,
        ))
    }

    fn validate(&self) -> Result<(), ScannerError> {
        if self.range_scanner.max_block_range == 0 {
            return Err(ScannerError::InvalidMaxBlockRange);
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ScannerError::InvalidMaxConcurrentFetches);
        }
        Gateway::parse(&self.content_resolver.gateway)?;
        Ok(())
    }
}
