use std::fmt;

use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// Identifier of a chat session, the key a transcript is scanned by.
///
/// On the wire it is the indexed `uint256 chatId` topic of the message event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatSessionId(pub U256);

impl ChatSessionId {
    /// The id encoded as a log topic.
    #[must_use]
    pub fn as_topic(&self) -> B256 {
        B256::from(self.0.to_be_bytes::<32>())
    }
}

impl From<u64> for ChatSessionId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for ChatSessionId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for ChatSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a message's `created_at` came from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimestampSource {
    /// The `timestamp` field of the event itself.
    #[default]
    Ledger,
    /// The timestamp of the block the log was included in.
    Block,
    /// Neither was available; the time of assembly was used.
    Assumed,
}
