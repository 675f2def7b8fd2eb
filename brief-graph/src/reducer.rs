//! Message log reducer and the trimmed view sent to models.

use brief_core::Message;
use std::collections::BTreeMap;

/// Default number of trailing messages a model sees.
pub const DEFAULT_HISTORY_WINDOW: usize = 70;

/// Merges `incoming` into `existing`.
///
/// The result is the union of both logs keyed by sequence number and ordered by it.
/// A sequence number already present in `existing` is never added again, which makes
/// re-applying the same update a no-op: `merge(&merge(a, b), b) == merge(a, b)`.
pub fn merge_messages(existing: &[Message], incoming: &[Message]) -> Vec<Message> {
    let mut by_seq: BTreeMap<u64, &Message> = BTreeMap::new();
    for message in existing {
        by_seq.entry(message.seq()).or_insert(message);
    }
    for message in incoming {
        by_seq.entry(message.seq()).or_insert(message);
    }
    by_seq.into_values().cloned().collect()
}

/// In-place form of [`merge_messages`] for the common append case.
pub fn append_messages(log: &mut Vec<Message>, incoming: impl IntoIterator<Item = Message>) {
    let incoming: Vec<Message> = incoming.into_iter().collect();
    if incoming.is_empty() {
        return;
    }
    *log = merge_messages(log, &incoming);
}

/// Model input projection of a message log. The log itself is left untouched.
///
/// Keeps the last `max_messages`, then starts the window at its first user message so
/// it never opens on a tool result whose call was cut off, and drops trailing assistant
/// answers. Without any user message in the window, leading tool results are dropped.
pub fn trim_history(messages: &[Message], max_messages: usize) -> Vec<Message> {
    let start = messages.len().saturating_sub(max_messages);
    let window = &messages[start..];

    let first_human = window.iter().position(Message::is_human);
    let begin = match first_human {
        Some(index) => index,
        None => window.iter().position(|m| !matches!(m, Message::Tool { .. })).unwrap_or(window.len()),
    };
    let mut trimmed = &window[begin..];

    while let Some((last, rest)) = trimmed.split_last() {
        if last.is_final_answer() && !rest.is_empty() {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_vec()
}
