//! Observable state containers read by the display layer.
//!
//! Each [`Signal`] owns its latest value and fans changes out to subscriber
//! channels. Writing a value equal to the current one is a no-op, so
//! subscribers never see duplicate notifications.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::config::OutputConfig;
use crate::pose::{OutputPayload, Pose};
use crate::session::{ConnectionStatus, SessionIdentity};

/// A value plus the channels that want to hear about changes to it.
#[derive(Debug)]
pub struct Signal<T> {
    value: T,
    subscribers: Vec<Sender<T>>,
}

impl<T: Clone + PartialEq> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Receive every future change. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Store `value` and notify subscribers. Returns `false` when nothing changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        let current = &self.value;
        self.subscribers
            .retain(|subscriber| subscriber.send(current.clone()).is_ok());
        true
    }

    /// Update in place through `f`, notifying only if the result differs.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.value.clone();
        f(&mut next);
        self.set(next)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Everything the viewer publishes for display.
#[derive(Debug)]
pub struct ViewerState {
    pub status: Signal<ConnectionStatus>,
    pub session: Signal<Option<SessionIdentity>>,
    pub latest_pose: Signal<Option<Pose>>,
    pub latest_output: Signal<Option<OutputPayload>>,
    pub output_config: Signal<OutputConfig>,
}

impl ViewerState {
    pub fn new(output_config: OutputConfig) -> Self {
        Self {
            status: Signal::new(ConnectionStatus::Disconnected),
            session: Signal::new(None),
            latest_pose: Signal::new(None),
            latest_output: Signal::new(None),
            output_config: Signal::new(output_config),
        }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
