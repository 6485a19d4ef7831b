//! Assembly of decoded events and resolved content into ordered transcripts.

mod assembler;
mod builder;
mod message;
mod scanner;

pub use assembler::assemble;
pub use builder::{DEFAULT_MAX_CONCURRENT_FETCHES, TranscriptScannerBuilder};
pub use message::Message;
pub use scanner::TranscriptScanner;

use std::collections::HashMap;

use alloy::primitives::BlockNumber;
use serde::{Deserialize, Serialize};

use crate::types::TimestampSource;

/// Messages of one chat session, ascending by `created_at`.
///
/// A transcript can be kept by a caller between polls and grown with [`Transcript::merge`];
/// message ids make repeated merges of overlapping scans idempotent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Wraps `messages`, sorting them stably by creation time.
    #[must_use]
    pub fn new(mut messages: Vec<Message>) -> Self {
        messages.sort_by_key(|m| m.created_at);
        Self { messages }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Highest block any message was logged in, where an incremental re-scan can resume.
    #[must_use]
    pub fn last_block(&self) -> Option<BlockNumber> {
        self.messages.iter().map(|m| m.block_number).max()
    }

    /// Merges a re-scan into this transcript and returns how many messages were new.
    ///
    /// An incoming message replaces the existing one with the same id in place, so a message
    /// whose content failed to resolve earlier picks up its payload on a later scan. What the
    /// transcript already knows is never downgraded: a resolved payload survives an incoming
    /// message without one, and an assumed timestamp never replaces a known creation time.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = Message>) -> usize {
        let mut index: HashMap<String, usize> =
            self.messages.iter().enumerate().map(|(i, m)| (m.id.clone(), i)).collect();
        let mut added = 0;

        for mut message in incoming {
            if let Some(&i) = index.get(&message.id) {
                let existing = &mut self.messages[i];
                if message.payload.is_none() && existing.payload.is_some() {
                    message.payload = existing.payload.take();
                    message.resolved_address = existing.resolved_address.take();
                }
                if message.timestamp_source == TimestampSource::Assumed {
                    message.created_at = existing.created_at;
                    message.timestamp_source = existing.timestamp_source;
                }
                *existing = message;
            } else {
                index.insert(message.id.clone(), self.messages.len());
                self.messages.push(message);
                added += 1;
            }
        }

        self.messages.sort_by_key(|m| m.created_at);
        added
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}

impl IntoIterator for Transcript {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256};
    use serde_json::json;

    use super::*;
    use crate::types::ChatSessionId;

    fn message(block: u64, log_index: u64, created_at: u64) -> Message {
        let transaction_hash = B256::with_last_byte(block as u8);
        Message {
            id: Message::id_for(&transaction_hash, log_index),
            chat_id: ChatSessionId::from(1u64),
            sender: Address::ZERO,
            content_pointer: "cid".into(),
            resolved_address: None,
            payload: None,
            created_at,
            timestamp_source: TimestampSource::Ledger,
            block_number: block,
            transaction_hash,
            log_index,
        }
    }

    #[test]
    fn merge_adds_new_and_replaces_known_ids() {
        let mut transcript = Transcript::new(vec![message(1, 0, 10), message(2, 0, 20)]);

        let mut resolved = message(2, 0, 20);
        resolved.payload = Some(json!({ "text": "late" }));
        let added = transcript.merge([resolved, message(3, 0, 15)]);

        assert_eq!(added, 1);
        assert_eq!(transcript.len(), 3);
        let order: Vec<_> = transcript.iter().map(|m| m.block_number).collect();
        assert_eq!(order, vec![1, 3, 2]);
        assert_eq!(transcript.messages()[2].text(), Some("late"));
    }

    #[test]
    fn merge_keeps_resolved_payload_when_rescan_fails_to_fetch() {
        let mut resolved = message(1, 0, 10);
        resolved.payload = Some(json!({ "text": "hello" }));
        resolved.resolved_address = Some("https://gw.example/ipfs/cid".into());
        let mut transcript = Transcript::new(vec![resolved]);

        let mut unresolved = message(1, 0, 10);
        unresolved.resolved_address = Some("https://gw.example/ipfs/cid".into());
        assert_eq!(transcript.merge([unresolved]), 0);

        assert_eq!(transcript.messages()[0].text(), Some("hello"));
        assert_eq!(
            transcript.messages()[0].resolved_address.as_deref(),
            Some("https://gw.example/ipfs/cid")
        );
    }

    #[test]
    fn merge_keeps_known_creation_time_over_assumed_one() {
        let mut assumed_earlier = message(1, 0, 10);
        assumed_earlier.timestamp_source = TimestampSource::Assumed;
        let mut transcript = Transcript::new(vec![assumed_earlier, message(2, 0, 20)]);

        let mut assumed_now = message(1, 0, 5_000);
        assumed_now.timestamp_source = TimestampSource::Assumed;
        transcript.merge([assumed_now]);

        assert_eq!(transcript.messages()[0].block_number, 1);
        assert_eq!(transcript.messages()[0].created_at, 10);
    }

    #[test]
    fn merge_takes_ledger_time_over_assumed_one() {
        let mut assumed = message(1, 0, 5_000);
        assumed.timestamp_source = TimestampSource::Assumed;
        let mut transcript = Transcript::new(vec![assumed]);

        transcript.merge([message(1, 0, 10)]);

        assert_eq!(transcript.messages()[0].created_at, 10);
        assert_eq!(transcript.messages()[0].timestamp_source, TimestampSource::Ledger);
    }

    #[test]
    fn merging_same_scan_twice_is_idempotent() {
        let scan = vec![message(1, 0, 10), message(1, 1, 10), message(4, 0, 30)];
        let mut transcript = Transcript::default();

        assert_eq!(transcript.merge(scan.clone()), 3);
        assert_eq!(transcript.merge(scan.clone()), 0);
        assert_eq!(transcript.into_messages(), scan);
    }

    #[test]
    fn merge_deduplicates_within_incoming_batch() {
        let mut transcript = Transcript::default();

        assert_eq!(transcript.merge([message(1, 0, 10), message(1, 0, 10)]), 1);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn last_block_is_highest_block() {
        let transcript = Transcript::new(vec![message(9, 0, 1), message(4, 0, 2)]);

        assert_eq!(transcript.last_block(), Some(9));
        assert_eq!(Transcript::default().last_block(), None);
    }

    #[test]
    fn serializes_as_message_array() {
        let transcript = Transcript::new(vec![message(1, 0, 10)]);

        let value = serde_json::to_value(&transcript).unwrap();

        assert_eq!(value[0]["createdAt"], json!(10));
        assert_eq!(value[0]["timestampSource"], json!("ledger"));
        assert_eq!(serde_json::from_value::<Transcript>(value).unwrap(), transcript);
    }
}
