use alloy::{
    hex,
    primitives::{Address, BlockNumber, TxHash},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    content_resolver::extract_text,
    types::{ChatSessionId, TimestampSource},
};

/// One entry of a reconstructed transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// `<transaction hash>-<log index>`, unique per log and stable across scans.
    pub id: String,
    pub chat_id: ChatSessionId,
    pub sender: Address,
    pub content_pointer: String,
    pub resolved_address: Option<String>,
    /// The fetched document, `None` when the content could not be resolved.
    pub payload: Option<Value>,
    /// Seconds since the Unix epoch; see `timestamp_source` for where it came from.
    pub created_at: u64,
    pub timestamp_source: TimestampSource,
    pub block_number: BlockNumber,
    pub transaction_hash: TxHash,
    pub log_index: u64,
}

impl Message {
    /// Builds the id of the message logged at `log_index` in `transaction_hash`.
    #[must_use]
    pub fn id_for(transaction_hash: &TxHash, log_index: u64) -> String {
        format!("{transaction_hash}-{log_index}")
    }

    /// Text carried by the payload, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.payload.as_ref().and_then(extract_text)
    }

    /// Text to show for this message: the payload text, or the raw pointer when there is none.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.text().unwrap_or(&self.content_pointer)
    }

    #[must_use]
    pub fn sender_hex(&self) -> String {
        hex::encode_prefixed(self.sender)
    }

    /// Whether `created_at` was read from the ledger rather than assumed.
    #[must_use]
    pub fn has_ledger_time(&self) -> bool {
        self.timestamp_source != TimestampSource::Assumed
    }
}
