use std::ops::RangeInclusive;

use alloy::{
    primitives::{Address, BlockNumber},
    rpc::types::Log,
};

use crate::{
    LedgerClient, ScannerError,
    content_resolver::{ContentFetcher, ContentResolver},
    event_decoder::{self, TranscriptFilter},
    range_scanner::RangeScanner,
    transcript::{Message, Transcript, assemble},
    types::ChatSessionId,
};

/// Reconstructs chat transcripts from a ledger and a content network.
///
/// Built with [`TranscriptScannerBuilder`](crate::TranscriptScannerBuilder). Every call is an
/// independent read-only reconstruction; nothing is cached between calls.
#[derive(Debug)]
pub struct TranscriptScanner<L, F> {
    contract_address: Address,
    ledger: L,
    range_scanner: RangeScanner,
    resolver: ContentResolver<F>,
    max_concurrent_fetches: usize,
}

impl<L: LedgerClient, F: ContentFetcher> TranscriptScanner<L, F> {
    pub(crate) fn new(
        contract_address: Address,
        ledger: L,
        range_scanner: RangeScanner,
        resolver: ContentResolver<F>,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self { contract_address, ledger, range_scanner, resolver, max_concurrent_fetches }
    }

    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[must_use]
    pub fn range_scanner(&self) -> &RangeScanner {
        &self.range_scanner
    }

    #[must_use]
    pub fn resolver(&self) -> &ContentResolver<F> {
        &self.resolver
    }

    /// Returns every message of `chat_id` within the lookback window, oldest first.
    ///
    /// Blocks that cannot be fetched, malformed logs and unreachable content are tolerated and
    /// logged; an empty chat yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns an error only if the ledger head cannot be read.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self), fields(contract = %self.contract_address)))]
    pub async fn fetch_transcript(
        &self,
        chat_id: ChatSessionId,
    ) -> Result<Vec<Message>, ScannerError> {
        let filter = self.filter(chat_id);
        let logs = self.range_scanner.scan(&self.ledger, &filter).await?;
        Ok(self.build_messages(&logs, chat_id).await)
    }

    /// Returns the messages of `chat_id` logged within `range`, oldest first.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self), fields(contract = %self.contract_address)))]
    pub async fn fetch_range(
        &self,
        chat_id: ChatSessionId,
        range: RangeInclusive<BlockNumber>,
    ) -> Vec<Message> {
        let filter = self.filter(chat_id);
        let logs = self.range_scanner.scan_range(&self.ledger, &filter, range).await;
        self.build_messages(&logs, chat_id).await
    }

    /// Brings `transcript` up to the current head and returns the number of new messages.
    ///
    /// Scanning resumes at the transcript's last block, which is scanned again so messages
    /// logged later in that block are not missed. An empty transcript gets a full scan.
    ///
    /// # Errors
    ///
    /// Returns an error only if the ledger head cannot be read.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, transcript), fields(known = transcript.len())))]
    pub async fn refresh(
        &self,
        chat_id: ChatSessionId,
        transcript: &mut Transcript,
    ) -> Result<usize, ScannerError> {
        let Some(last_block) = transcript.last_block() else {
            let messages = self.fetch_transcript(chat_id).await?;
            return Ok(transcript.merge(messages));
        };

        let head = self.ledger.head_block().await?;
        if head < last_block {
            warn!(head = head, last_block = last_block, "Ledger head is behind the transcript");
            return Ok(0);
        }

        let messages = self.fetch_range(chat_id, last_block..=head).await;
        let added = transcript.merge(messages);
        info!(added = added, total = transcript.len(), "Transcript refreshed");
        Ok(added)
    }

    fn filter(&self, chat_id: ChatSessionId) -> TranscriptFilter {
        TranscriptFilter::new(self.contract_address, chat_id)
    }

    async fn build_messages(&self, logs: &[Log], chat_id: ChatSessionId) -> Vec<Message> {
        let events = event_decoder::decode(logs, chat_id);
        let contents = self
            .resolver
            .resolve_all(events.iter().map(|e| e.content_pointer.as_str()), self.max_concurrent_fetches)
            .await;

        let messages = assemble(events, contents);
        debug!(
            chat_id = %chat_id,
            logs = logs.len(),
            messages = messages.len(),
            unresolved = messages.iter().filter(|m| m.payload.is_none()).count(),
            "Assembled transcript"
        );
        messages
    }
}
