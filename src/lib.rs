//! Transcript-Scanner reconstructs chat transcripts from message events logged on an EVM chain
//! and the content-addressed documents those events point to.
//!
//! The main entry point is [`TranscriptScanner`], built via [`TranscriptScannerBuilder`]. A call
//! to [`TranscriptScanner::fetch_transcript`] runs four stages in order:
//!
//! 1. [`RangeScanner`] walks the recent block range in bounded windows and collects the chat's
//!    raw logs, shrinking a window that fails and skipping single blocks that keep failing.
//! 2. [`event_decoder::decode`] turns the logs into [`event_decoder::ChatMessageEvent`]s,
//!    dropping entries that are malformed or belong to another chat.
//! 3. [`content_resolver::ContentResolver`] normalizes each event's content pointer to a gateway
//!    address and fetches the JSON document behind it.
//! 4. [`transcript::assemble`] joins both into [`Message`]s ordered by creation time.
//!
//! # Failure model
//!
//! Only failures that make the whole result meaningless are returned as [`ScannerError`]:
//! invalid configuration, or a ledger whose head cannot be read. Everything else degrades the
//! result instead of failing it. An unreachable block is skipped, a malformed log is dropped,
//! and a message whose content cannot be fetched is kept with `payload: None`. All of these are
//! logged through `tracing` under the `transcript_scanner` target.
//!
//! An empty chat is `Ok(vec![])`, never an error.
//!
//! # Ordering and identity
//!
//! Messages are sorted by `created_at` with ties kept in ledger order. Each message id is
//! `<transaction hash>-<log index>`, so transcripts from overlapping scans can be merged with
//! [`Transcript::merge`] without duplicates.
//!
//! # Robust providers
//!
//! The [`robust_provider`] module provides [`robust_provider::RobustProvider`], a wrapper that can
//! retry and fail over across multiple RPC endpoints. It is the default [`LedgerClient`].

#[macro_use]
mod logging;

pub mod content_resolver;
pub mod event_decoder;
pub mod range_scanner;
pub mod robust_provider;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod transcript;

mod error;
mod ledger;
mod types;

pub use error::ScannerError;
pub use ledger::LedgerClient;
pub use types::{ChatSessionId, TimestampSource};

pub use content_resolver::{
    ContentFetcher, ContentResolver, ContentResolverBuilder, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_GATEWAY, HttpFetcher, ResolvedContent,
};
pub use event_decoder::{ChatMessageEvent, TranscriptFilter};
pub use range_scanner::{
    DEFAULT_LOOKBACK_BLOCKS, DEFAULT_MAX_BLOCK_RANGE, RangeScanner, RangeScannerBuilder,
};
pub use transcript::{
    DEFAULT_MAX_CONCURRENT_FETCHES, Message, Transcript, TranscriptScanner,
    TranscriptScannerBuilder,
};
