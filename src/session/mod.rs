//! Connection status and session identity derived from producer events.
//!
//! All mutation goes through [`SessionMachine`]; the display layer only reads
//! the signals it publishes.

mod machine;
mod rate;
mod stderr;
mod watchdog;


pub use machine::{SessionMachine, TransitionReason};
pub use rate::{format_rate_summary, PoseRateMeter, RateSummary};
pub use stderr::{classify_stderr, StderrSeverity};
pub use watchdog::LivenessWatchdog;

use crate::ipc::SessionFields;

/// Peer connection status as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        }
    }
}

/// Session identity issued by the producer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub name: Option<String>,
    pub code: Option<String>,
    pub transport: Option<String>,
    pub ip: Option<String>,
    pub port: Option<u16>,
}

impl SessionIdentity {
    /// Overwrite the fields present in `fields`, keep the rest.
    pub fn merge(&mut self, fields: &SessionFields) {
        if let Some(name) = &fields.name {
            self.name = Some(name.clone());
        }
        if let Some(code) = &fields.code {
            self.code = Some(code.clone());
        }
        if let Some(transport) = &fields.transport {
            self.transport = Some(transport.clone());
        }
        if let Some(ip) = &fields.ip {
            self.ip = Some(ip.clone());
        }
        if let Some(port) = fields.port {
            self.port = Some(port);
        }
    }

    /// `ip:port` when both are known.
    pub fn endpoint(&self) -> Option<String> {
        match (&self.ip, self.port) {
            (Some(ip), Some(port)) => Some(format!("{ip}:{port}")),
            _ => None,
        }
    }
}
