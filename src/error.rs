use std::sync::Arc;

use alloy::{
    eips::BlockId,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

use crate::robust_provider::Error as RobustProviderError;

/// Terminal errors of a transcript scan.
///
/// Per-window fetch failures, malformed logs and unreachable content never surface here; they
/// are absorbed by the pipeline and show up as missing blocks, dropped entries or messages
/// without a payload. What remains is either a misconfiguration detected at build time or a
/// ledger that cannot be reached at all.
#[derive(Error, Debug, Clone)]
pub enum ScannerError {
    /// The underlying RPC transport returned an error.
    #[error("RPC error: {0}")]
    RpcError(Arc<RpcError<TransportErrorKind>>),

    /// A requested block could not be retrieved.
    #[error("Block not found, Block Id: {0}")]
    BlockNotFound(BlockId),

    /// A timeout elapsed while waiting for an RPC response.
    #[error("Operation timed out")]
    Timeout,

    /// The configured maximum block range is invalid (must be greater than zero).
    #[error("Max block range must be greater than 0")]
    InvalidMaxBlockRange,

    /// The configured maximum number of concurrent content fetches is invalid (must be greater
    /// than zero).
    #[error("Max concurrent fetches must be greater than 0")]
    InvalidMaxConcurrentFetches,

    /// The content gateway is not an absolute http(s) URL.
    #[error("Invalid content gateway: {0}")]
    InvalidGateway(String),

    /// The HTTP client used for content fetches could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl From<RobustProviderError> for ScannerError {
    fn from(error: RobustProviderError) -> ScannerError {
        match error {
            RobustProviderError::Timeout => ScannerError::Timeout,
            RobustProviderError::RpcError(err) => ScannerError::RpcError(err),
            RobustProviderError::BlockNotFound(block) => ScannerError::BlockNotFound(block),
        }
    }
}

impl From<RpcError<TransportErrorKind>> for ScannerError {
    fn from(error: RpcError<TransportErrorKind>) -> Self {
        ScannerError::RpcError(Arc::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robust_provider_errors_map_variant_to_variant() {
        assert!(matches!(ScannerError::from(RobustProviderError::Timeout), ScannerError::Timeout));

        let block = BlockId::number(12);
        assert!(matches!(
            ScannerError::from(RobustProviderError::BlockNotFound(block)),
            ScannerError::BlockNotFound(id) if id == block
        ));

        let rpc = RobustProviderError::from(TransportErrorKind::custom_str("connection refused"));
        assert!(matches!(ScannerError::from(rpc), ScannerError::RpcError(_)));
    }
}
