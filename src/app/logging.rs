use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_CAP_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_CAP_BYTES: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: OnceLock<Mutex<Option<CappedLog>>> = OnceLock::new();

/// Debug log in the temp dir, emptied whenever it would pass its cap.
pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("posewatch.log")
}

/// Crash log (metadata only unless content logging is on).
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("posewatch_crash.log")
}

/// Append-only file that starts over from empty instead of growing past `cap`.
struct CappedLog {
    file: fs::File,
    len: u64,
    cap: u64,
}

impl CappedLog {
    fn open(path: &Path, cap: u64) -> Option<Self> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()?;
        let len = file.metadata().map(|meta| meta.len()).unwrap_or(0);
        let mut log = Self { file, len, cap };
        if log.len > cap {
            log.clear();
        }
        Some(log)
    }

    fn clear(&mut self) {
        // Append mode keeps writing at the new end, i.e. offset 0.
        if self.file.set_len(0).is_ok() {
            self.len = 0;
        }
    }

    fn append(&mut self, line: &str) {
        let size = line.len() as u64;
        if self.len.saturating_add(size) > self.cap {
            self.clear();
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(size);
        }
    }
}

fn debug_log() -> &'static Mutex<Option<CappedLog>> {
    DEBUG_LOG.get_or_init(|| Mutex::new(None))
}

fn with_debug_log(action: impl FnOnce(&mut Option<CappedLog>)) {
    // Not lock_or_recover: that helper logs through here.
    let mut guard = debug_log()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    action(&mut guard);
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

fn apply_log_flags(enabled: bool, content_enabled: bool) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    LOG_CONTENT_ENABLED.store(enabled && content_enabled, Ordering::Relaxed);
    with_debug_log(|log| {
        *log = enabled
            .then(|| CappedLog::open(&log_file_path(), LOG_CAP_BYTES))
            .flatten();
    });
}

/// Enable file logging when `--logs` is set and `--no-logs` is not.
pub fn init_logging(config: &AppConfig) {
    apply_log_flags(config.logs && !config.no_logs, config.log_content);
}

/// Append a line to the debug log. Keeps diagnostics off the stdout payload stream.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let line = format!("[{}] {msg}\n", unix_millis());
    with_debug_log(|log| {
        if let Some(log) = log.as_mut() {
            log.append(&line);
        }
    });
}

/// Log raw producer output or session codes; requires `--log-content`.
pub fn log_debug_content(msg: &str) {
    if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        log_debug(msg);
    }
}

fn panic_message(info: &panic::PanicHookInfo<'_>) -> String {
    if !LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        return "<payload hidden without --log-content>".to_string();
    }
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string payload>".to_string())
}

/// Record a panic in the crash log. Only the location is kept unless content logging is on.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let line = format!(
        "[{}] posewatch {} panicked at {location}: {}\n",
        unix_millis(),
        env!("CARGO_PKG_VERSION"),
        panic_message(info)
    );
    if let Some(mut crash_log) = CappedLog::open(&crash_log_path(), CRASH_LOG_CAP_BYTES) {
        crash_log.append(&line);
    }
}

#[cfg(test)]
pub(crate) fn set_logging_for_tests(enabled: bool, content_enabled: bool) {
    apply_log_flags(enabled, content_enabled);
}
