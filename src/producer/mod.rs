//! Process control boundary for the external pose producer.
//!
//! The viewer never talks to the peer device directly. It asks a producer
//! process to open a transport and then consumes that process's stdout (JSON
//! events) and stderr (diagnostics) as discrete lines.

mod child;

use anyhow::Result;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use crate::config::ConnectionKind;

pub use child::ChildProducer;

/// Parameters for one producer start request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartConfig {
    pub connection: ConnectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsample_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_hz: Option<f64>,
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionKind::Wifi,
            name: None,
            code: None,
            upsample_hz: None,
            rate_limit_hz: None,
        }
    }
}

impl StartConfig {
    /// Producer argv for this request, in a fixed order.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--connection".to_string(),
            self.connection.label().to_string(),
        ];
        if let Some(name) = &self.name {
            args.push("--name".to_string());
            args.push(name.clone());
        }
        if let Some(code) = &self.code {
            args.push("--code".to_string());
            args.push(code.clone());
        }
        if let Some(hz) = self.upsample_hz {
            args.push("--upsample-hz".to_string());
            args.push(hz.to_string());
        }
        if let Some(hz) = self.rate_limit_hz {
            args.push("--rate-limit-hz".to_string());
            args.push(hz.to_string());
        }
        args
    }
}

/// One unit of producer output, delivered in emission order per stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerLine {
    Stdout(String),
    Stderr(String),
    /// Stdout closed; carries the exit code when it could be collected.
    Exited(Option<i32>),
}

/// Start/stop seam between the viewer and whatever runs the producer.
pub trait ProducerControl {
    /// Launch the producer. Its output lines go to `lines` until it exits or is stopped.
    fn start(&mut self, config: &StartConfig, lines: Sender<ProducerLine>) -> Result<()>;

    /// Stop the producer if it is running. Stopping an idle producer succeeds.
    fn stop(&mut self) -> Result<()>;
}
