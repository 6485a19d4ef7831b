//! In-memory ledger and content doubles for exercising the pipeline without a node or gateway.

use std::{
    collections::HashMap,
    ops::RangeInclusive,
    sync::{Arc, Mutex, PoisonError},
};

use alloy::{
    primitives::{Address, B256, BlockNumber, U256, address},
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
    transports::TransportErrorKind,
};
use reqwest::StatusCode;
use serde_json::Value;

use crate::{
    LedgerClient,
    content_resolver::{ContentFetcher, FetchError},
    event_decoder::MessageSent,
    robust_provider::Error,
};

/// Contract address used by [`LogBuilder`] unless overridden.
pub const TEST_CONTRACT: Address = address!("0x00000000000000000000000000000000000c4a77");

/// Builds `MessageSent` logs as a node would return them.
#[derive(Clone, Debug)]
pub struct LogBuilder {
    contract: Address,
    chat_id: u64,
    sender: Address,
    pointer: String,
    timestamp: u64,
    block: BlockNumber,
    block_timestamp: Option<u64>,
    log_index: u64,
    tx_hash: Option<B256>,
}

impl LogBuilder {
    #[must_use]
    pub fn new(chat_id: u64) -> Self {
        Self {
            contract: TEST_CONTRACT,
            chat_id,
            sender: address!("0x0000000000000000000000000000000000000a11"),
            pointer: "bafybeigabc".to_owned(),
            timestamp: 1_000,
            block: 1,
            block_timestamp: None,
            log_index: 0,
            tx_hash: None,
        }
    }

    #[must_use]
    pub fn contract(mut self, contract: Address) -> Self {
        self.contract = contract;
        self
    }

    #[must_use]
    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    #[must_use]
    pub fn pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = pointer.into();
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn block(mut self, block: BlockNumber) -> Self {
        self.block = block;
        self
    }

    #[must_use]
    pub fn block_timestamp(mut self, block_timestamp: u64) -> Self {
        self.block_timestamp = Some(block_timestamp);
        self
    }

    #[must_use]
    pub fn log_index(mut self, log_index: u64) -> Self {
        self.log_index = log_index;
        self
    }

    /// Overrides the transaction hash, which otherwise is derived from the block number so that
    /// logs of one block share a transaction.
    #[must_use]
    pub fn tx_hash(mut self, tx_hash: B256) -> Self {
        self.tx_hash = Some(tx_hash);
        self
    }

    #[must_use]
    pub fn build(self) -> Log {
        let event = MessageSent {
            chatId: U256::from(self.chat_id),
            sender: self.sender,
            messageCid: self.pointer,
            timestamp: U256::from(self.timestamp),
        };

        Log {
            inner: alloy::primitives::Log { address: self.contract, data: event.encode_log_data() },
            block_hash: Some(B256::left_padding_from(&self.block.to_be_bytes())),
            block_number: Some(self.block),
            block_timestamp: self.block_timestamp,
            transaction_hash: Some(
                self.tx_hash.unwrap_or_else(|| B256::right_padding_from(&self.block.to_be_bytes())),
            ),
            transaction_index: Some(0),
            log_index: Some(self.log_index),
            removed: false,
        }
    }
}

/// Ledger double answering log queries from a fixed set of logs.
///
/// Queries whose window touches a failing block are rejected, and every queried window is
/// recorded so tests can assert on the scan's request pattern.
#[derive(Clone, Debug, Default)]
pub struct MockLedger {
    head: Option<BlockNumber>,
    logs: Vec<Log>,
    failing: Vec<RangeInclusive<BlockNumber>>,
    queries: Arc<Mutex<Vec<RangeInclusive<BlockNumber>>>>,
}

impl MockLedger {
    #[must_use]
    pub fn new(head: BlockNumber) -> Self {
        Self { head: Some(head), ..Self::default() }
    }

    /// A ledger whose head cannot be read.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_logs(mut self, logs: impl IntoIterator<Item = Log>) -> Self {
        self.logs.extend(logs);
        self
    }

    /// Rejects every query overlapping `blocks`.
    #[must_use]
    pub fn failing(mut self, blocks: RangeInclusive<BlockNumber>) -> Self {
        self.failing.push(blocks);
        self
    }

    /// Windows queried so far, in request order.
    #[must_use]
    pub fn queries(&self) -> Vec<RangeInclusive<BlockNumber>> {
        self.queries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn matches(filter: &Filter, log: &Log) -> bool {
        filter.address.matches(&log.address())
            && filter.topics.iter().enumerate().all(|(i, topic)| {
                topic.is_empty() || log.topics().get(i).is_some_and(|t| topic.matches(t))
            })
    }
}

impl LedgerClient for MockLedger {
    async fn head_block(&self) -> Result<BlockNumber, Error> {
        self.head.ok_or(Error::Timeout)
    }

    async fn fetch_logs(&self, filter: &Filter) -> Result<Vec<Log>, Error> {
        let from = filter.get_from_block().unwrap_or_default();
        let to = filter.get_to_block().unwrap_or(BlockNumber::MAX);
        self.queries.lock().unwrap_or_else(PoisonError::into_inner).push(from..=to);

        if self.failing.iter().any(|bad| *bad.start() <= to && from <= *bad.end()) {
            return Err(TransportErrorKind::custom_str("query returned more than 10000 results").into());
        }

        Ok(self
            .logs
            .iter()
            .filter(|log| log.block_number.is_some_and(|n| (from..=to).contains(&n)))
            .filter(|log| Self::matches(filter, log))
            .cloned()
            .collect())
    }
}

/// Content double serving JSON documents from a map.
///
/// Unknown addresses answer `404`; addresses marked failing answer `502`.
#[derive(Clone, Debug, Default)]
pub struct MockFetcher {
    documents: HashMap<String, Value>,
    failing: Vec<String>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, address: impl Into<String>, document: Value) -> Self {
        self.documents.insert(address.into(), document);
        self
    }

    #[must_use]
    pub fn failing(mut self, address: impl Into<String>) -> Self {
        self.failing.push(address.into());
        self
    }

    /// Addresses requested so far, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ContentFetcher for MockFetcher {
    async fn fetch_json(&self, address: &str) -> Result<Value, FetchError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(address.to_owned());

        if self.failing.iter().any(|a| a == address) {
            return Err(FetchError::Status(StatusCode::BAD_GATEWAY));
        }
        self.documents.get(address).cloned().ok_or(FetchError::Status(StatusCode::NOT_FOUND))
    }
}
