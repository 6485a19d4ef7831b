//! Paged, failure-tolerant retrieval of a chat's logs from the ledger.
//!
//! ```rust,no_run
//! use alloy::primitives::address;
//! use transcript_scanner::{
//!     event_decoder::TranscriptFilter, range_scanner::RangeScannerBuilder,
//!     robust_provider::{RobustProvider, RobustProviderBuilder},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger: RobustProvider = RobustProviderBuilder::new("http://localhost:8545").build().await?;
//! let scanner = RangeScannerBuilder::new().lookback(50_000).max_block_range(2_000).build()?;
//!
//! let filter = TranscriptFilter::new(address!("0x00000000000000000000000000000000000c4a77"), 42u64);
//! let logs = scanner.scan(&ledger, &filter).await?;
//! println!("{} logs", logs.len());
//! # Ok(())
//! # }
//! ```

mod builder;
mod scanner;
mod window;

pub use builder::RangeScannerBuilder;
pub use scanner::RangeScanner;
pub use window::{FailureOutcome, ScanWindow};

/// How many blocks below the head a scan reaches by default.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 10_000;

/// Largest number of blocks requested in one log query by default.
pub const DEFAULT_MAX_BLOCK_RANGE: u64 = 1_000;
