//! Viewer controller: producer lifecycle plus the single-threaded event loop.
//!
//! # Architecture
//!
//! - Producer reader threads push [`ProducerLine`]s into a per-start channel
//! - The loop selects over that channel, the watchdog tick and an optional poll tick
//! - All state changes go through [`SessionMachine`] on the loop thread
//!
//! Stopping drops the line receiver before the producer is asked to stop, so
//! late lines from the old process land in a closed channel.

mod sink;

use anyhow::{bail, Context, Result};
use crossbeam_channel::{never, select, tick, unbounded, Receiver};
use std::time::{Duration, Instant};

use crate::config::{OutputConfig, WatchdogConfig};
use crate::log_debug;
use crate::pose::OutputPayload;
use crate::producer::{ProducerControl, ProducerLine, StartConfig};
use crate::session::{ConnectionStatus, SessionIdentity, SessionMachine, TransitionReason};

pub use sink::JsonLinesSink;

/// Consumer of what the viewer publishes.
pub trait OutputSink {
    fn publish(&mut self, payload: &OutputPayload) -> Result<()>;

    fn status_changed(&mut self, _status: ConnectionStatus, _session: Option<&SessionIdentity>) {}

    /// Polled on every timer tick; returning `true` ends the loop.
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Why [`Viewer::run_until_exit`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    ProducerExited(Option<i32>),
    Shutdown,
}

pub struct Viewer<P: ProducerControl> {
    machine: SessionMachine,
    producer: P,
    lines: Option<Receiver<ProducerLine>>,
    watchdog_tick: Option<Receiver<Instant>>,
    watchdog_period: Duration,
    poll_period: Option<Duration>,
}

impl<P: ProducerControl> Viewer<P> {
    pub fn new(producer: P, output_config: OutputConfig, watchdog: WatchdogConfig) -> Self {
        Self {
            machine: SessionMachine::new(output_config, watchdog),
            producer,
            lines: None,
            watchdog_tick: None,
            watchdog_period: watchdog.period,
            poll_period: None,
        }
    }

    /// Re-publish the latest payload at `hz` instead of once per pose.
    pub fn with_poll_hz(mut self, hz: Option<f64>) -> Self {
        self.poll_period = hz
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .map(|hz| Duration::from_secs_f64(1.0 / hz));
        self
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut SessionMachine {
        &mut self.machine
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub fn is_attached(&self) -> bool {
        self.lines.is_some()
    }

    pub fn set_output_config(&mut self, config: OutputConfig) {
        if self.machine.set_output_config(config) {
            log_debug("output config replaced");
        }
    }

    /// Ask the producer to start. On failure the status is forced to disconnected.
    pub fn start(&mut self, config: &StartConfig) -> Result<()> {
        self.detach();
        self.machine.begin_connecting();

        let (tx, rx) = unbounded();
        self.lines = Some(rx);
        self.watchdog_tick = Some(tick(self.watchdog_period));

        if let Err(err) = self.producer.start(config, tx) {
            self.detach();
            self.machine
                .set_status(ConnectionStatus::Disconnected, TransitionReason::StartFailed);
            tracing::warn!(error = %format!("{err:#}"), "producer start failed");
            return Err(err.context("failed to start pose producer"));
        }
        Ok(())
    }

    /// Detach, stop the producer, then return status and identity to initial values.
    pub fn stop(&mut self) -> Result<()> {
        self.detach();
        let result = self.producer.stop();
        self.machine.reset(TransitionReason::Stopped);
        if let Err(err) = &result {
            tracing::warn!(error = %format!("{err:#}"), "producer stop failed");
        }
        result.context("failed to stop pose producer")
    }

    fn detach(&mut self) {
        self.lines = None;
        self.watchdog_tick = None;
    }

    /// Process producer output until it exits or `sink` asks to stop.
    pub fn run_until_exit<S: OutputSink>(&mut self, sink: &mut S) -> Result<LoopExit> {
        let (Some(lines), Some(watchdog)) = (self.lines.clone(), self.watchdog_tick.clone()) else {
            bail!("viewer is not started");
        };
        let poll = self.poll_period.map(tick).unwrap_or_else(never);
        let status_rx = self.machine.state_mut().status.subscribe();
        let output_rx = self.machine.state_mut().latest_output.subscribe();

        loop {
            let mut exit = None;
            select! {
                recv(lines) -> line => match line {
                    Ok(ProducerLine::Stdout(text)) => {
                        self.machine.handle_stdout_line(&text, Instant::now());
                    }
                    Ok(ProducerLine::Stderr(text)) => self.machine.handle_stderr_line(&text),
                    Ok(ProducerLine::Exited(code)) => exit = Some(self.on_producer_exit(code)),
                    Err(_) => exit = Some(self.on_producer_exit(None)),
                },
                recv(watchdog) -> now => {
                    self.machine.check_liveness(now.unwrap_or_else(|_| Instant::now()));
                    if sink.should_stop() {
                        exit = Some(LoopExit::Shutdown);
                    }
                }
                recv(poll) -> _ => {
                    if let Some(payload) = self.machine.state().latest_output.get() {
                        sink.publish(payload)?;
                    }
                    if sink.should_stop() {
                        exit = Some(LoopExit::Shutdown);
                    }
                }
            }

            for status in status_rx.try_iter() {
                sink.status_changed(status, self.machine.session());
            }
            for payload in output_rx.try_iter().flatten() {
                if self.poll_period.is_none() {
                    sink.publish(&payload)?;
                }
            }

            if let Some(exit) = exit {
                return Ok(exit);
            }
        }
    }

    fn on_producer_exit(&mut self, code: Option<i32>) -> LoopExit {
        tracing::info!(code = ?code, "producer exited");
        log_debug(&format!("producer exited with code {code:?}"));
        self.detach();
        self.machine
            .set_status(ConnectionStatus::Disconnected, TransitionReason::ProducerExited);
        LoopExit::ProducerExited(code)
    }
}
