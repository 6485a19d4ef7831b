use crate::{
    ScannerError,
    range_scanner::{DEFAULT_LOOKBACK_BLOCKS, DEFAULT_MAX_BLOCK_RANGE, RangeScanner},
};

#[derive(Clone, Debug)]
pub struct RangeScannerBuilder {
    pub lookback: u64,
    pub max_block_range: u64,
}

impl Default for RangeScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeScannerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { lookback: DEFAULT_LOOKBACK_BLOCKS, max_block_range: DEFAULT_MAX_BLOCK_RANGE }
    }

    /// Number of blocks below the head to include. A lookback of 0 scans only the head block.
    #[must_use]
    pub fn lookback(mut self, lookback: u64) -> Self {
        self.lookback = lookback;
        self
    }

    /// Upper bound on the number of blocks covered by a single log query.
    #[must_use]
    pub fn max_block_range(mut self, max_block_range: u64) -> Self {
        self.max_block_range = max_block_range;
        self
    }

    /// # Errors
    ///
    /// Returns [`ScannerError::InvalidMaxBlockRange`] if `max_block_range` is 0.
    pub fn build(self) -> Result<RangeScanner, ScannerError> {
        if self.max_block_range == 0 {
            return Err(ScannerError::InvalidMaxBlockRange);
        }
        Ok(RangeScanner::new(self.lookback, self.max_block_range))
    }
}
