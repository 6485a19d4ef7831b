//! The read-only view of the ledger the scanner needs.

use alloy::{
    network::Network,
    primitives::BlockNumber,
    rpc::types::{Filter, Log},
};

use crate::robust_provider::{Error, RobustProvider};

/// A ledger that can report its head and answer log queries over an inclusive block window.
///
/// [`RobustProvider`] is the production implementation. Implementations must perform the
/// address/topic filtering server-side; the scanner never filters returned logs again.
pub trait LedgerClient: Send + Sync {
    /// Current head block number.
    fn head_block(&self) -> impl Future<Output = Result<BlockNumber, Error>> + Send;

    /// Logs matching `filter`, which always carries explicit `from_block` and `to_block`.
    fn fetch_logs(&self, filter: &Filter) -> impl Future<Output = Result<Vec<Log>, Error>> + Send;
}

impl<N: Network> LedgerClient for RobustProvider<N> {
    async fn head_block(&self) -> Result<BlockNumber, Error> {
        self.get_block_number().await
    }

    async fn fetch_logs(&self, filter: &Filter) -> Result<Vec<Log>, Error> {
        self.get_logs(filter).await
    }
}
