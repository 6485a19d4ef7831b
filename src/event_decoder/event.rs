use alloy::{
    hex,
    primitives::{Address, BlockNumber, TxHash},
    sol,
};

use crate::types::ChatSessionId;

sol! {
    /// Emitted by the chat contract once per posted message.
    ///
    /// `messageCid` is a content pointer to the message body held in content-addressed storage;
    /// `timestamp` is the contract's `block.timestamp` at posting time, in seconds.
    #[derive(Debug, PartialEq, Eq)]
    event MessageSent(
        uint256 indexed chatId,
        address indexed sender,
        string messageCid,
        uint256 timestamp
    );
}

/// A [`MessageSent`] log decoded together with its position on the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessageEvent {
    pub chat_id: ChatSessionId,
    pub sender: Address,
    /// Raw content pointer exactly as it was logged.
    pub content_pointer: String,
    /// Event timestamp in seconds. `None` when the event carried zero or an out of range value.
    pub logged_at: Option<u64>,
    pub block_number: BlockNumber,
    /// Block timestamp reported alongside the log by nodes that support it.
    pub block_timestamp: Option<u64>,
    pub transaction_hash: TxHash,
    pub log_index: u64,
}

impl ChatMessageEvent {
    /// Lower-case `0x`-prefixed sender, stable for string comparisons.
    #[must_use]
    pub fn sender_hex(&self) -> String {
        hex::encode_prefixed(self.sender)
    }

    /// Position of the event in the ledger, the natural scan order.
    #[must_use]
    pub fn position(&self) -> (BlockNumber, u64) {
        (self.block_number, self.log_index)
    }
}
