use std::ops::RangeInclusive;

use alloy::{primitives::BlockNumber, rpc::types::Log};

use crate::{
    LedgerClient, ScannerError,
    event_decoder::TranscriptFilter,
    range_scanner::window::{FailureOutcome, ScanWindow},
};

/// Walks a block range in bounded windows and collects every log matching a filter.
///
/// A window whose query fails is halved and retried; a single block that still fails is skipped
/// with a warning. Only a failure to read the chain head aborts a scan.
#[derive(Clone, Debug)]
pub struct RangeScanner {
    lookback: u64,
    max_block_range: u64,
}

impl RangeScanner {
    pub(crate) fn new(lookback: u64, max_block_range: u64) -> Self {
        Self { lookback, max_block_range }
    }

    #[must_use]
    pub fn lookback(&self) -> u64 {
        self.lookback
    }

    #[must_use]
    pub fn max_block_range(&self) -> u64 {
        self.max_block_range
    }

    /// Scans `[head - lookback, head]` for logs matching `filter`.
    ///
    /// Logs are returned in ascending block order, and in ledger order within a block.
    ///
    /// # Errors
    ///
    /// Returns an error if the current head block cannot be read.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all, fields(chat_id = %filter.chat_id())))]
    pub async fn scan<L: LedgerClient>(
        &self,
        ledger: &L,
        filter: &TranscriptFilter,
    ) -> Result<Vec<Log>, ScannerError> {
        let head = match ledger.head_block().await {
            Ok(head) => head,
            Err(e) => {
                error!(error = %e, "Failed to read head block");
                return Err(e.into());
            }
        };
        let from = head.saturating_sub(self.lookback);

        Ok(self.scan_range(ledger, filter, from..=head).await)
    }

    /// Scans an explicit inclusive block range.
    ///
    /// Unlike [`Self::scan`] this never fails: blocks whose logs cannot be fetched are skipped.
    pub async fn scan_range<L: LedgerClient>(
        &self,
        ledger: &L,
        filter: &TranscriptFilter,
        range: RangeInclusive<BlockNumber>,
    ) -> Vec<Log> {
        debug!(
            from_block = *range.start(),
            to_block = *range.end(),
            filter = %filter,
            "Scanning block range"
        );

        let mut window = ScanWindow::new(range, self.max_block_range);
        let mut logs = Vec::new();
        let mut skipped = 0u64;

        while let Some(current) = window.current() {
            let query = filter.for_range(*current.start(), *current.end());

            match ledger.fetch_logs(&query).await {
                Ok(batch) => {
                    trace!(
                        from_block = *current.start(),
                        to_block = *current.end(),
                        count = batch.len(),
                        "Fetched window"
                    );
                    logs.extend(batch);
                    window.on_success();
                }
                Err(e) => match window.on_failure() {
                    FailureOutcome::Shrunk { size } => {
                        debug!(
                            from_block = *current.start(),
                            to_block = *current.end(),
                            next_size = size,
                            error = %e,
                            "Log query failed, shrinking window"
                        );
                    }
                    FailureOutcome::Skipped { block } => {
                        skipped += 1;
                        warn!(block = block, error = %e, "Skipping block whose logs cannot be fetched");
                    }
                },
            }
        }

        if skipped > 0 {
            warn!(skipped = skipped, collected = logs.len(), "Scan finished with skipped blocks");
        } else {
            debug!(collected = logs.len(), "Scan finished");
        }

        logs
    }
}
