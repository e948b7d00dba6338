pub const DEFAULT_PRODUCER_CMD: &str = "python3 -m televoodoo";
pub const DEFAULT_LIVENESS_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_WATCHDOG_PERIOD_MS: u64 = 1_000;

pub const MIN_LIVENESS_TIMEOUT_MS: u64 = 1_000;
pub const MAX_LIVENESS_TIMEOUT_MS: u64 = 120_000;
pub const MIN_WATCHDOG_PERIOD_MS: u64 = 100;

pub const MIN_POLL_HZ: f64 = 0.1;
pub(super) const MAX_RATE_HZ: f64 = 1_000.0;
pub(super) const MAX_NAME_CHARS: usize = 64;
pub(super) const MAX_CODE_CHARS: usize = 32;
// Names are forwarded as argv to the producer and advertised over BLE/mDNS.
pub(super) const FORBIDDEN_NAME_CHARS: &[char] =
    &[';', '|', '&', '$', '`', '<', '>', '\\', '\'', '"', '\n', '\r'];
