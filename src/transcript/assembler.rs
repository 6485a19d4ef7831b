use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    content_resolver::ResolvedContent, event_decoder::ChatMessageEvent, transcript::Message,
    types::TimestampSource,
};

/// Joins decoded events with their resolved content and orders the result by creation time.
///
/// `contents[i]` belongs to `events[i]`; events without a matching entry get no payload. The
/// sort is stable, so messages sharing a timestamp keep the order they were scanned in.
#[must_use]
pub fn assemble(events: Vec<ChatMessageEvent>, contents: Vec<ResolvedContent>) -> Vec<Message> {
    if events.len() != contents.len() {
        debug!(events = events.len(), contents = contents.len(), "Event and content counts differ");
    }

    let now = unix_now();
    let mut contents = contents.into_iter();
    let mut messages: Vec<Message> = events
        .into_iter()
        .map(|event| into_message(event, contents.next().unwrap_or_default(), now))
        .collect();

    messages.sort_by_key(|m| m.created_at);
    messages
}

fn into_message(event: ChatMessageEvent, content: ResolvedContent, now: u64) -> Message {
    let (created_at, timestamp_source) = match (event.logged_at, event.block_timestamp) {
        (Some(ts), _) => (ts, TimestampSource::Ledger),
        (None, Some(ts)) => (ts, TimestampSource::Block),
        (None, None) => {
            debug!(
                tx_hash = %event.transaction_hash,
                log_index = event.log_index,
                "Message has no timestamp, assuming now"
            );
            (now, TimestampSource::Assumed)
        }
    };

    Message {
        id: Message::id_for(&event.transaction_hash, event.log_index),
        chat_id: event.chat_id,
        sender: event.sender,
        content_pointer: event.content_pointer,
        resolved_address: content.resolved_address,
        payload: content.raw,
        created_at,
        timestamp_source,
        block_number: event.block_number,
        transaction_hash: event.transaction_hash,
        log_index: event.log_index,
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}
