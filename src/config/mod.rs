//! Command-line parsing, validation, and the persisted output configuration.

mod defaults;
mod output;
mod validation;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::{
    DEFAULT_LIVENESS_TIMEOUT_MS, DEFAULT_PRODUCER_CMD, DEFAULT_WATCHDOG_PERIOD_MS,
    MAX_LIVENESS_TIMEOUT_MS, MIN_LIVENESS_TIMEOUT_MS, MIN_POLL_HZ, MIN_WATCHDOG_PERIOD_MS,
};
pub use output::{
    ensure_json_extension, load_output_config, parse_output_config, save_output_config,
    IncludeFormats, IncludeOrientation, OutputAxes, OutputConfig, TargetFrame,
};

/// CLI options for the posewatch viewer. Validated values are safe to forward as producer argv.
#[derive(Debug, Parser, Clone)]
#[command(about = "PoseWatch headless pose viewer", author, version)]
pub struct AppConfig {
    /// Transport the producer should open
    #[arg(long, value_enum, default_value_t = ConnectionKind::Wifi)]
    pub connection: ConnectionKind,

    /// Session/peripheral name (producer picks a random one when omitted)
    #[arg(long)]
    pub name: Option<String>,

    /// Session access code (producer picks a random one when omitted)
    #[arg(long)]
    pub code: Option<String>,

    /// Upsample poses to this frequency (Hz)
    #[arg(long = "upsample-hz")]
    pub upsample_hz: Option<f64>,

    /// Cap pose output at this frequency (Hz)
    #[arg(long = "rate-limit-hz")]
    pub rate_limit_hz: Option<f64>,

    /// Producer command line (split with shell quoting rules)
    #[arg(
        long = "producer-cmd",
        env = "POSEWATCH_PRODUCER_CMD",
        default_value = DEFAULT_PRODUCER_CMD
    )]
    pub producer_cmd: String,

    /// Working directory for the producer; a `.venv/bin/python` inside it is preferred
    #[arg(long = "producer-dir", env = "POSEWATCH_PRODUCER_DIR")]
    pub producer_dir: Option<PathBuf>,

    /// Output configuration file to load (JSON)
    #[arg(long = "output-config")]
    pub output_config: Option<PathBuf>,

    /// Write the active output configuration to this path (".json" is appended if missing)
    #[arg(long = "save-output-config")]
    pub save_output_config: Option<PathBuf>,

    /// Re-print the latest output payload at this rate (Hz)
    #[arg(long = "poll-hz")]
    pub poll_hz: Option<f64>,

    /// Peer silence tolerated before the session is marked disconnected (milliseconds)
    #[arg(long = "liveness-timeout-ms", default_value_t = DEFAULT_LIVENESS_TIMEOUT_MS)]
    pub liveness_timeout_ms: u64,

    /// Liveness check period (milliseconds)
    #[arg(long = "watchdog-period-ms", default_value_t = DEFAULT_WATCHDOG_PERIOD_MS)]
    pub watchdog_period_ms: u64,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "POSEWATCH_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "POSEWATCH_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging raw producer lines and session codes (debug log only)
    #[arg(
        long = "log-content",
        env = "POSEWATCH_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

/// Transport the external producer uses to reach the peer device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Wifi,
    Ble,
    Usb,
}

impl ConnectionKind {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionKind::Wifi => "wifi",
            ConnectionKind::Ble => "ble",
            ConnectionKind::Usb => "usb",
        }
    }
}

/// Timing knobs for the session liveness watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogConfig {
    pub timeout: Duration,
    pub period: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_LIVENESS_TIMEOUT_MS),
            period: Duration::from_millis(DEFAULT_WATCHDOG_PERIOD_MS),
        }
    }
}
