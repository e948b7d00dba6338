//! PoseWatch: connection status and pose output variants for a 6-DoF pose stream.
//!
//! A producer process opens the transport to the peer device and prints JSON
//! events on stdout. The viewer parses those lines, tracks connection status
//! with a liveness watchdog, and derives the configured output variants of
//! every pose relative to a resettable origin.

mod app;
pub mod config;
pub mod ipc;
mod lock;
pub mod pose;
pub mod producer;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod viewer;

pub use app::{crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic};
pub(crate) use lock::lock_or_recover;
