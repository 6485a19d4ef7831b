//! Turns raw ledger logs into typed [`ChatMessageEvent`]s.
//!
//! Decoding is lenient per entry: a log that does not decode as [`MessageSent`], lacks its
//! ledger position, or belongs to another chat session is dropped and the batch carries on.

mod event;
mod filter;

pub use event::{ChatMessageEvent, MessageSent};
pub use filter::TranscriptFilter;

use alloy::rpc::types::Log;

use crate::types::ChatSessionId;

/// Why a single log was dropped.
#[derive(Debug, thiserror::Error)]
enum Rejection {
    #[error("not a MessageSent log: {0}")]
    Abi(#[from] alloy::sol_types::Error),
    #[error("log has no {0}")]
    MissingField(&'static str),
    #[error("log belongs to chat {0}")]
    ForeignChat(ChatSessionId),
}

/// Decodes `logs` in order, keeping only well-formed events of `chat_id`.
#[must_use]
pub fn decode(logs: &[Log], chat_id: ChatSessionId) -> Vec<ChatMessageEvent> {
    let mut events = Vec::with_capacity(logs.len());

    for log in logs {
        match decode_one(log, chat_id) {
            Ok(event) => events.push(event),
            Err(Rejection::ForeignChat(other)) => {
                warn!(
                    expected = %chat_id,
                    found = %other,
                    tx_hash = ?log.transaction_hash,
                    "Dropping event of another chat session"
                );
            }
            Err(reason) => {
                debug!(
                    reason = %reason,
                    block_number = ?log.block_number,
                    tx_hash = ?log.transaction_hash,
                    "Dropping undecodable log"
                );
            }
        }
    }

    if events.len() < logs.len() {
        info!(decoded = events.len(), dropped = logs.len() - events.len(), "Decoded chat logs");
    }

    events
}

fn decode_one(log: &Log, chat_id: ChatSessionId) -> Result<ChatMessageEvent, Rejection> {
    let message = log.log_decode::<MessageSent>()?.inner.data;

    let event_chat = ChatSessionId::from(message.chatId);
    if event_chat != chat_id {
        return Err(Rejection::ForeignChat(event_chat));
    }

    Ok(ChatMessageEvent {
        chat_id: event_chat,
        sender: message.sender,
        content_pointer: message.messageCid,
        logged_at: u64::try_from(message.timestamp).ok().filter(|ts| *ts != 0),
        block_number: log.block_number.ok_or(Rejection::MissingField("block_number"))?,
        block_timestamp: log.block_timestamp.filter(|ts| *ts != 0),
        transaction_hash: log
            .transaction_hash
            .ok_or(Rejection::MissingField("transaction_hash"))?,
        log_index: log.log_index.ok_or(Rejection::MissingField("log_index"))?,
    })
}
