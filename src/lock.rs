use std::sync::{Mutex, MutexGuard};

/// Lock `lock`, taking over the data if a panicking holder poisoned it.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        crate::log_debug(&format!("mutex poisoned in {context}; recovering"));
        poisoned.into_inner()
    })
}
