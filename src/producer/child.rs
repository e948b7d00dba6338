use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{ProducerControl, ProducerLine, StartConfig};
use crate::lock_or_recover;
use crate::log_debug;

/// Grace period between SIGTERM and SIGKILL.
const STOP_GRACE: Duration = Duration::from_millis(100);
/// How long the stdout reader waits for an exit status after EOF.
const EXIT_STATUS_WAIT: Duration = Duration::from_millis(200);
const EXIT_STATUS_POLL: Duration = Duration::from_millis(20);

/// Interpreter variables that would leak the viewer's Python setup into the producer.
pub(super) const STRIPPED_ENV_VARS: [&str; 4] = [
    "PYTHONHOME",
    "PYTHONPATH",
    "PYTHONEXECUTABLE",
    "PYTHONUSERBASE",
];

type ChildSlot = Arc<Mutex<Option<Child>>>;

/// Runs the producer as a child process in its own process group.
pub struct ChildProducer {
    program: String,
    base_args: Vec<String>,
    working_dir: Option<PathBuf>,
    child: ChildSlot,
}

impl ChildProducer {
    pub fn new(program: impl Into<String>, base_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
            working_dir: None,
            child: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Process id of the running child, if any.
    pub fn pid(&self) -> Option<u32> {
        lock_or_recover(&self.child, "ChildProducer::pid")
            .as_ref()
            .map(Child::id)
    }

    pub fn is_running(&self) -> bool {
        let mut slot = lock_or_recover(&self.child, "ChildProducer::is_running");
        match slot.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(_))) | Some(Err(_)) | None => false,
        }
    }

    pub(super) fn build_command(&self, config: &StartConfig) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .args(config.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        for var in STRIPPED_ENV_VARS {
            command.env_remove(var);
        }
        command.env("PYTHONUNBUFFERED", "1");
        own_process_group(&mut command);
        command
    }
}

impl ProducerControl for ChildProducer {
    fn start(&mut self, config: &StartConfig, lines: Sender<ProducerLine>) -> Result<()> {
        // A second start replaces the running producer.
        if let Err(err) = self.stop() {
            log_debug(&format!("failed to stop previous producer: {err:#}"));
        }

        let mut child = self
            .build_command(config)
            .spawn()
            .with_context(|| format!("failed to start producer '{}'", self.program))?;
        let stdout = child
            .stdout
            .take()
            .context("failed to capture producer stdout")?;
        let stderr = child
            .stderr
            .take()
            .context("failed to capture producer stderr")?;
        let pid = child.id();
        *lock_or_recover(&self.child, "ChildProducer::start") = Some(child);

        let stderr_tx = lines.clone();
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(|line| line.ok()) {
                if line.trim().is_empty() {
                    continue;
                }
                if stderr_tx.send(ProducerLine::Stderr(line)).is_err() {
                    break;
                }
            }
        });

        let slot = Arc::clone(&self.child);
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(|line| line.ok()) {
                if lines.send(ProducerLine::Stdout(line)).is_err() {
                    return;
                }
            }
            let code = collect_exit_code(&slot, pid);
            let _ = lines.send(ProducerLine::Exited(code));
        });

        tracing::info!(
            pid,
            program = %self.program,
            connection = config.connection.label(),
            "producer started"
        );
        log_debug(&format!("producer started: pid={pid} program={}", self.program));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let child = lock_or_recover(&self.child, "ChildProducer::stop").take();
        match child {
            Some(child) => terminate(child),
            None => Ok(()),
        }
    }
}

impl Drop for ChildProducer {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            log_debug(&format!("producer teardown failed: {err:#}"));
        }
    }
}

/// Reap the child once its stdout closed, unless it was replaced or stopped meanwhile.
fn collect_exit_code(slot: &Mutex<Option<Child>>, pid: u32) -> Option<i32> {
    let mut waited = Duration::ZERO;
    loop {
        {
            let mut guard = lock_or_recover(slot, "ChildProducer::collect_exit_code");
            let child = guard.as_mut().filter(|child| child.id() == pid)?;
            match child.try_wait() {
                Ok(Some(status)) => {
                    guard.take();
                    return status.code();
                }
                Ok(None) => {}
                Err(err) => {
                    log_debug(&format!("try_wait on producer {pid} failed: {err}"));
                    return None;
                }
            }
        }
        if waited >= EXIT_STATUS_WAIT {
            return None;
        }
        thread::sleep(EXIT_STATUS_POLL);
        waited += EXIT_STATUS_POLL;
    }
}

/// SIGTERM, a short grace, then SIGKILL to the whole group, then reap.
fn terminate(mut child: Child) -> Result<()> {
    let pid = child.id();

    #[cfg(unix)]
    {
        let pid = pid as i32;
        if !send_signal(-pid, libc::SIGTERM) {
            send_signal(pid, libc::SIGTERM);
        }
        thread::sleep(STOP_GRACE);
        match child.try_wait() {
            Ok(Some(status)) => {
                tracing::info!(pid, code = ?status.code(), "producer stopped");
                return Ok(());
            }
            Ok(None) => {}
            Err(err) => log_debug(&format!("try_wait on producer {pid} failed: {err}")),
        }
        log_debug(&format!("producer {pid} ignored SIGTERM; sending SIGKILL"));
        send_signal(-pid, libc::SIGKILL);
        send_signal(pid, libc::SIGKILL);
    }

    #[cfg(not(unix))]
    {
        let _ = STOP_GRACE;
        if let Err(err) = child.kill() {
            log_debug(&format!("failed to kill producer {pid}: {err}"));
        }
    }

    let status = child
        .wait()
        .with_context(|| format!("failed to reap producer process {pid}"))?;
    tracing::info!(pid, code = ?status.code(), "producer killed");
    Ok(())
}

#[cfg(unix)]
fn send_signal(pid: i32, signo: i32) -> bool {
    // SAFETY: kill(2) has no memory-safety preconditions.
    let ret = unsafe { libc::kill(pid, signo) };
    if ret != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            log_debug(&format!("failed to send signal {signo} to {pid}: {err}"));
        }
        return false;
    }
    true
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    // SAFETY: setpgid is async-signal-safe and touches no parent state.
    unsafe {
        command.pre_exec(|| {
            if libc::setpgid(0, 0) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}
