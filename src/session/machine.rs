use std::time::Instant;

use strip_ansi_escapes::strip;

use super::rate::PoseRateMeter;
use super::stderr::{classify_stderr, StderrSeverity};
use super::watchdog::LivenessWatchdog;
use super::{ConnectionStatus, SessionIdentity};
use crate::config::{OutputConfig, WatchdogConfig};
use crate::ipc::{parse_event_line, EventClass, ProducerEvent, SessionFields};
use crate::pose::{transform_pose, Pose};
use crate::store::ViewerState;
use crate::{log_debug, log_debug_content};

/// Why a status transition happened. Carried into the trace log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    Started,
    Liveness(&'static str),
    Disconnect(&'static str),
    LivenessTimeout,
    StderrFatal,
    ProducerExited,
    StartFailed,
    Stopped,
}

impl TransitionReason {
    pub fn describe(self) -> String {
        match self {
            TransitionReason::Started => "start requested".to_string(),
            TransitionReason::Liveness(event) => format!("liveness event {event}"),
            TransitionReason::Disconnect(event) => format!("disconnect event {event}"),
            TransitionReason::LivenessTimeout => "liveness timeout".to_string(),
            TransitionReason::StderrFatal => "fatal producer stderr".to_string(),
            TransitionReason::ProducerExited => "producer exited".to_string(),
            TransitionReason::StartFailed => "start failed".to_string(),
            TransitionReason::Stopped => "stop requested".to_string(),
        }
    }
}

/// Owns the connection status, session identity, origin and published output.
///
/// Every mutation of viewer state funnels through here; callers pass in `now`
/// so the watchdog can be driven deterministically.
#[derive(Debug)]
pub struct SessionMachine {
    state: ViewerState,
    watchdog: LivenessWatchdog,
    origin: Option<Pose>,
    rate: PoseRateMeter,
}

impl SessionMachine {
    pub fn new(output_config: OutputConfig, watchdog: WatchdogConfig) -> Self {
        Self {
            state: ViewerState::new(output_config),
            watchdog: LivenessWatchdog::new(watchdog.timeout),
            origin: None,
            rate: PoseRateMeter::new(),
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Mutable access for subscribing to signals.
    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.state
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.state.status.get()
    }

    pub fn session(&self) -> Option<&SessionIdentity> {
        self.state.session.get().as_ref()
    }

    pub fn origin(&self) -> Option<&Pose> {
        self.origin.as_ref()
    }

    pub fn rate(&self) -> &PoseRateMeter {
        &self.rate
    }

    pub fn watchdog(&self) -> &LivenessWatchdog {
        &self.watchdog
    }

    pub fn output_config(&self) -> OutputConfig {
        *self.state.output_config.get()
    }

    /// Swap the output config. The next pose is transformed with it; the origin is kept.
    pub fn set_output_config(&mut self, config: OutputConfig) -> bool {
        self.state.output_config.set(config)
    }

    /// Enter `connecting` for an explicit start and forget all prior peer activity.
    pub fn begin_connecting(&mut self) {
        self.watchdog.reset();
        self.rate.reset();
        self.set_status(ConnectionStatus::Connecting, TransitionReason::Started);
    }

    /// Return status and identity to their initial values. The origin survives.
    pub fn reset(&mut self, reason: TransitionReason) {
        self.watchdog.reset();
        self.set_status(ConnectionStatus::Disconnected, reason);
        self.state.session.set(None);
    }

    /// Apply a status change. Setting the current status again is a no-op.
    pub fn set_status(&mut self, next: ConnectionStatus, reason: TransitionReason) -> bool {
        let previous = self.status();
        if !self.state.status.set(next) {
            return false;
        }
        match reason {
            TransitionReason::StderrFatal | TransitionReason::StartFailed => tracing::warn!(
                from = previous.label(),
                to = next.label(),
                reason = %reason.describe(),
                "connection status changed"
            ),
            _ => tracing::info!(
                from = previous.label(),
                to = next.label(),
                reason = %reason.describe(),
                "connection status changed"
            ),
        }
        log_debug(&format!(
            "status {} -> {} ({})",
            previous.label(),
            next.label(),
            reason.describe()
        ));
        true
    }

    /// Feed one raw stdout line; each JSON object on it is handled left to right.
    pub fn handle_stdout_line(&mut self, line: &str, now: Instant) {
        let ansi_free = strip(line.as_bytes());
        let cleaned = String::from_utf8_lossy(&ansi_free);
        log_debug_content(&format!("producer stdout: {cleaned}"));
        for event in parse_event_line(&cleaned) {
            self.handle_event(&event, now);
        }
    }

    /// Feed one stderr line. Only error-like lines end the session.
    pub fn handle_stderr_line(&mut self, line: &str) {
        match classify_stderr(line) {
            StderrSeverity::Fatal => {
                log_debug_content(&format!("producer stderr (fatal): {line}"));
                self.set_status(ConnectionStatus::Disconnected, TransitionReason::StderrFatal);
            }
            StderrSeverity::Informational => {
                log_debug_content(&format!("producer stderr: {line}"));
            }
        }
    }

    pub fn handle_event(&mut self, event: &ProducerEvent, now: Instant) {
        match event.class() {
            EventClass::Identity => {
                if let ProducerEvent::Session(fields) = event {
                    self.merge_session(fields);
                }
            }
            EventClass::Liveness => {
                self.watchdog.record_activity(now);
                if let ProducerEvent::Pose(pose) = event {
                    self.apply_pose(pose, now);
                }
                self.set_status(
                    ConnectionStatus::Connected,
                    TransitionReason::Liveness(event.name()),
                );
            }
            EventClass::Disconnect => {
                self.set_status(
                    ConnectionStatus::Disconnected,
                    TransitionReason::Disconnect(event.name()),
                );
            }
            EventClass::Rejection => {
                tracing::warn!(event = event.name(), "peer rejected");
                log_debug(&format!(
                    "peer rejected: {} {}",
                    event.name(),
                    event_message(event).unwrap_or("")
                ));
            }
            EventClass::Informational => {
                log_debug(&format!(
                    "producer event: {} {}",
                    event.name(),
                    event_message(event).unwrap_or("")
                ));
            }
            EventClass::Ignored => {}
        }
    }

    /// Periodic watchdog check. Returns `true` when the session was downgraded.
    pub fn check_liveness(&mut self, now: Instant) -> bool {
        if self.status() != ConnectionStatus::Connected || !self.watchdog.is_expired(now) {
            return false;
        }
        let silent_ms = self
            .watchdog
            .last_activity()
            .map(|last| now.saturating_duration_since(last).as_millis())
            .unwrap_or_default();
        tracing::info!(
            silent_ms = silent_ms as u64,
            timeout_ms = self.watchdog.timeout().as_millis() as u64,
            "no peer activity; assuming link lost"
        );
        self.set_status(
            ConnectionStatus::Disconnected,
            TransitionReason::LivenessTimeout,
        )
    }

    fn merge_session(&mut self, fields: &SessionFields) {
        let changed = self.state.session.update(|session| {
            session
                .get_or_insert_with(SessionIdentity::default)
                .merge(fields);
        });
        if changed {
            if let Some(session) = self.state.session.get() {
                tracing::info!(
                    name = session.name.as_deref().unwrap_or(""),
                    transport = session.transport.as_deref().unwrap_or(""),
                    endpoint = session.endpoint().as_deref().unwrap_or(""),
                    "session identity updated"
                );
                log_debug_content(&format!("session code: {:?}", session.code));
            }
        }
    }

    fn apply_pose(&mut self, pose: &Pose, now: Instant) {
        let config = self.output_config();
        let outcome = transform_pose(pose, &config, self.origin.as_ref());
        if pose.movement_start {
            log_debug("origin reset by movement start");
        }
        self.origin = outcome.origin;
        self.rate.record(now);
        self.state.latest_pose.set(Some(*pose));
        self.state.latest_output.set(Some(outcome.payload));
    }
}

fn event_message(event: &ProducerEvent) -> Option<&str> {
    match event {
        ProducerEvent::SessionRejected(fields)
        | ProducerEvent::BleAuthFailed(fields)
        | ProducerEvent::Warn(fields)
        | ProducerEvent::Error(fields) => fields.message.as_deref(),
        ProducerEvent::BleState(fields) => fields.state.as_deref(),
        _ => None,
    }
}
