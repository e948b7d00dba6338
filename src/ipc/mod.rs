//! Inbound JSON-lines protocol from the pose producer.
//!
//! The producer prints one JSON object per event on stdout, mixed with
//! decorative non-JSON output. This module turns raw lines into typed events:
//!
//! - `parser`: splits concatenated objects and drops non-JSON fragments
//! - `protocol`: the closed set of event types, with a fallback for unknown ones

mod parser;
mod protocol;

#[cfg(test)]
mod tests;

pub use parser::{parse_event_line, split_event_line};
pub use protocol::{
    BleStateFields, EndpointFields, EventClass, MessageFields, ProducerEvent, SessionFields,
};
