use anyhow::{Context, Result};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use super::OutputSink;
use crate::pose::OutputPayload;
use crate::session::{ConnectionStatus, SessionIdentity};

/// Writes one JSON document per payload to `out` and human-readable status lines to `diag`.
pub struct JsonLinesSink<W: Write, E: Write> {
    out: W,
    diag: E,
    stop_flag: Option<&'static AtomicBool>,
    published: u64,
}

impl<W: Write, E: Write> JsonLinesSink<W, E> {
    pub fn new(out: W, diag: E) -> Self {
        Self {
            out,
            diag,
            stop_flag: None,
            published: 0,
        }
    }

    /// Stop the loop once `flag` is raised (e.g. from a signal handler).
    pub fn with_stop_flag(mut self, flag: &'static AtomicBool) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.diag)
    }
}

impl<W: Write, E: Write> OutputSink for JsonLinesSink<W, E> {
    fn publish(&mut self, payload: &OutputPayload) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }
        serde_json::to_writer(&mut self.out, payload).context("failed to encode output payload")?;
        self.out
            .write_all(b"\n")
            .and_then(|()| self.out.flush())
            .context("failed to write output payload")?;
        self.published += 1;
        Ok(())
    }

    fn status_changed(&mut self, status: ConnectionStatus, session: Option<&SessionIdentity>) {
        let mut line = format!("status: {}", status.label());
        if let Some(session) = session {
            if let Some(name) = &session.name {
                line.push_str(&format!(" name={name}"));
            }
            if let Some(transport) = &session.transport {
                line.push_str(&format!(" transport={transport}"));
            }
            if let Some(endpoint) = session.endpoint() {
                line.push_str(&format!(" endpoint={endpoint}"));
            }
        }
        let _ = writeln!(self.diag, "{line}");
    }

    fn should_stop(&mut self) -> bool {
        self.stop_flag
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}
