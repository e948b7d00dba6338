//! Splits producer stdout lines into JSON events.
//!
//! Concurrent writers in the producer occasionally land two objects on one line
//! with no separator (`{...}{...}`). Each `}{` boundary starts a new fragment;
//! fragments that are not JSON (QR art, banners) are dropped on their own.

use serde_json::Value;

use super::protocol::ProducerEvent;

/// Split `line` at every `}{` boundary and return the fragments that parse as JSON, in order.
pub fn split_event_line(line: &str) -> Vec<Value> {
    split_fragments(line)
        .into_iter()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .filter_map(|fragment| serde_json::from_str::<Value>(fragment).ok())
        .collect()
}

/// Parse every fragment of `line` into a producer event.
pub fn parse_event_line(line: &str) -> Vec<ProducerEvent> {
    split_event_line(line)
        .into_iter()
        .filter_map(ProducerEvent::from_value)
        .collect()
}

fn split_fragments(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fragments = Vec::new();
    let mut start = 0;
    for idx in 1..bytes.len() {
        if bytes[idx - 1] == b'}' && bytes[idx] == b'{' {
            fragments.push(&line[start..idx]);
            start = idx;
        }
    }
    fragments.push(&line[start..]);
    fragments
}
