use std::fmt;

use alloy::{
    primitives::{Address, BlockNumber},
    rpc::types::Filter,
    sol_types::SolEvent,
};

use crate::{event_decoder::MessageSent, types::ChatSessionId};

/// Log filter selecting every [`MessageSent`] event of one chat session on one contract.
///
/// The chat id is matched through the first indexed topic, so the ledger does the filtering and
/// only the session's own logs ever cross the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptFilter {
    contract_address: Address,
    chat_id: ChatSessionId,
}

impl TranscriptFilter {
    #[must_use]
    pub fn new(contract_address: Address, chat_id: impl Into<ChatSessionId>) -> Self {
        Self { contract_address, chat_id: chat_id.into() }
    }

    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    #[must_use]
    pub fn chat_id(&self) -> ChatSessionId {
        self.chat_id
    }

    /// The ledger filter restricted to `from..=to`.
    #[must_use]
    pub fn for_range(&self, from: BlockNumber, to: BlockNumber) -> Filter {
        Filter::from(self).from_block(from).to_block(to)
    }
}

impl From<&TranscriptFilter> for Filter {
    fn from(filter: &TranscriptFilter) -> Self {
        Filter::new()
            .address(filter.contract_address)
            .event_signature(MessageSent::SIGNATURE_HASH)
            .topic1(filter.chat_id.as_topic())
    }
}

impl fmt::Display for TranscriptFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TranscriptFilter(contract: {}, chat: {})", self.contract_address, self.chat_id)
    }
}
