use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

/// Raised by SIGINT/SIGTERM; the viewer loop checks it on every tick.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn handle_shutdown(_: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Route Ctrl-C and SIGTERM into a flag so the producer group is torn down on exit.
///
/// The producer lives in its own process group and never sees the terminal's
/// SIGINT, so the viewer has to outlive the signal long enough to stop it.
#[cfg(unix)]
pub(crate) fn install_shutdown_handlers() -> Result<()> {
    use anyhow::anyhow;
    use posewatch::log_debug;

    for signo in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: handle_shutdown only stores to an atomic, which is async-signal-safe.
        let installed = unsafe {
            let handler = handle_shutdown as *const () as libc::sighandler_t;
            libc::signal(signo, handler) != libc::SIG_ERR
        };
        if !installed {
            log_debug(&format!("failed to install handler for signal {signo}"));
            return Err(anyhow!("failed to install handler for signal {signo}"));
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn install_shutdown_handlers() -> Result<()> {
    Ok(())
}

pub(crate) fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN_REQUESTED
}

pub(crate) fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}
