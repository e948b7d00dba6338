//! JSON event protocol spoken by the pose producer on stdout.
//!
//! Every event is a JSON object with a `"type"` tag. Several producer versions
//! coexist in the field, so legacy names (`wifi_*`, `usb_*`, `ble_*`, `pose_start`)
//! are accepted alongside the unified ones and normalized here.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::pose::{EulerAngles, Pose, Position, Quaternion};

// ============================================================================
// Producer Events (producer → viewer)
// ============================================================================

/// Events emitted by the producer process.
///
/// Unknown `type` values deserialize to [`ProducerEvent::Unknown`] so newer
/// producers never break older viewers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ProducerEvent {
    /// Session identity announcement
    #[serde(rename = "session")]
    Session(SessionFields),

    /// Peer-level keepalive
    #[serde(rename = "heartbeat")]
    Heartbeat,

    /// Peer connected (unified name)
    #[serde(rename = "connected")]
    Connected,

    #[serde(rename = "wifi_connected")]
    WifiConnected,

    #[serde(rename = "usb_connected")]
    UsbConnected,

    /// BLE peer passed authentication
    #[serde(rename = "ble_auth_ok")]
    BleAuthOk,

    /// BLE control characteristic write
    #[serde(rename = "ble_control")]
    BleControl,

    /// Pose sample, normalized at parse time
    #[serde(rename = "pose")]
    Pose(#[serde(deserialize_with = "deserialize_pose_event")] Pose),

    /// Peer disconnected (unified name)
    #[serde(rename = "disconnected")]
    Disconnected,

    #[serde(rename = "wifi_disconnected")]
    WifiDisconnected,

    #[serde(rename = "usb_disconnected")]
    UsbDisconnected,

    /// Session code was wrong; the peer may retry
    #[serde(rename = "session_rejected")]
    SessionRejected(MessageFields),

    #[serde(rename = "ble_auth_failed")]
    BleAuthFailed(MessageFields),

    #[serde(rename = "server_starting")]
    ServerStarting,

    #[serde(rename = "server_listening")]
    ServerListening(EndpointFields),

    #[serde(rename = "server_stopped")]
    ServerStopped,

    #[serde(rename = "mdns_registered")]
    MdnsRegistered,

    #[serde(rename = "ble_state")]
    BleState(BleStateFields),

    /// Producer process keepalive. Says nothing about the peer link.
    #[serde(rename = "service_heartbeat")]
    ServiceHeartbeat,

    #[serde(rename = "resampling_enabled")]
    ResamplingEnabled,

    #[serde(rename = "warn")]
    Warn(MessageFields),

    #[serde(rename = "error")]
    Error(MessageFields),

    #[serde(other)]
    Unknown,
}

/// How the session state machine reacts to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Identity,
    Liveness,
    Disconnect,
    Rejection,
    Informational,
    Ignored,
}

impl ProducerEvent {
    pub fn class(&self) -> EventClass {
        match self {
            ProducerEvent::Session(_) => EventClass::Identity,
            ProducerEvent::Heartbeat
            | ProducerEvent::Connected
            | ProducerEvent::WifiConnected
            | ProducerEvent::UsbConnected
            | ProducerEvent::BleAuthOk
            | ProducerEvent::BleControl
            | ProducerEvent::Pose(_) => EventClass::Liveness,
            ProducerEvent::Disconnected
            | ProducerEvent::WifiDisconnected
            | ProducerEvent::UsbDisconnected => EventClass::Disconnect,
            ProducerEvent::SessionRejected(_) | ProducerEvent::BleAuthFailed(_) => {
                EventClass::Rejection
            }
            ProducerEvent::ServerStarting
            | ProducerEvent::ServerListening(_)
            | ProducerEvent::ServerStopped
            | ProducerEvent::MdnsRegistered
            | ProducerEvent::BleState(_)
            | ProducerEvent::ServiceHeartbeat
            | ProducerEvent::ResamplingEnabled
            | ProducerEvent::Warn(_)
            | ProducerEvent::Error(_) => EventClass::Informational,
            ProducerEvent::Unknown => EventClass::Ignored,
        }
    }

    /// Wire name of the event, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ProducerEvent::Session(_) => "session",
            ProducerEvent::Heartbeat => "heartbeat",
            ProducerEvent::Connected => "connected",
            ProducerEvent::WifiConnected => "wifi_connected",
            ProducerEvent::UsbConnected => "usb_connected",
            ProducerEvent::BleAuthOk => "ble_auth_ok",
            ProducerEvent::BleControl => "ble_control",
            ProducerEvent::Pose(_) => "pose",
            ProducerEvent::Disconnected => "disconnected",
            ProducerEvent::WifiDisconnected => "wifi_disconnected",
            ProducerEvent::UsbDisconnected => "usb_disconnected",
            ProducerEvent::SessionRejected(_) => "session_rejected",
            ProducerEvent::BleAuthFailed(_) => "ble_auth_failed",
            ProducerEvent::ServerStarting => "server_starting",
            ProducerEvent::ServerListening(_) => "server_listening",
            ProducerEvent::ServerStopped => "server_stopped",
            ProducerEvent::MdnsRegistered => "mdns_registered",
            ProducerEvent::BleState(_) => "ble_state",
            ProducerEvent::ServiceHeartbeat => "service_heartbeat",
            ProducerEvent::ResamplingEnabled => "resampling_enabled",
            ProducerEvent::Warn(_) => "warn",
            ProducerEvent::Error(_) => "error",
            ProducerEvent::Unknown => "unknown",
        }
    }

    /// Try to interpret a parsed JSON value as a producer event.
    ///
    /// Objects whose known `type` carries an ill-typed payload are rejected.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

/// Identity fields carried by a `session` event. Absent fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageFields {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointFields {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BleStateFields {
    #[serde(default, deserialize_with = "deserialize_ble_state")]
    pub state: Option<String>,
}

// ============================================================================
// Pose payload
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct PoseEnvelope {
    #[serde(default)]
    data: PoseData,
}

#[derive(Debug, Default, Deserialize)]
struct PoseData {
    #[serde(default)]
    absolute_input: RawPose,
}

/// Pose fields as the producer writes them.
///
/// Numbers that are missing, `null` or not numeric fall back to 0 (`qw` to 1)
/// so one bad field never costs the whole sample.
#[derive(Debug, Default, Deserialize)]
struct RawPose {
    #[serde(default)]
    movement_start: Option<bool>,
    #[serde(default)]
    pose_start: Option<bool>,
    #[serde(default, deserialize_with = "lenient_number")]
    x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    z: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    x_rot: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    y_rot: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    z_rot: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    qx: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    qy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    qz: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    qw: Option<f64>,
}

impl From<RawPose> for Pose {
    fn from(raw: RawPose) -> Self {
        // Either spelling counts; older producers only send `pose_start`.
        let movement_start = raw.movement_start.unwrap_or(false) || raw.pose_start.unwrap_or(false);
        let num = |value: Option<f64>| value.unwrap_or(0.0);
        Pose::new(
            movement_start,
            Position::new(num(raw.x), num(raw.y), num(raw.z)),
            Quaternion::new(num(raw.qx), num(raw.qy), num(raw.qz), raw.qw.unwrap_or(1.0)),
        )
        .with_reported_euler(EulerAngles::new(
            num(raw.x_rot),
            num(raw.y_rot),
            num(raw.z_rot),
        ))
    }
}

/// Ports arrive as numbers from current producers and as strings from some older ones.
fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Number(u16),
        Text(String),
    }

    match Option::<PortRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortRepr::Number(port)) => Ok(Some(port)),
        Some(PortRepr::Text(text)) => text
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Any JSON value is accepted; only numbers survive.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

/// macOS producers report the CoreBluetooth state as an integer, others as a name.
fn deserialize_ble_state<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

fn deserialize_pose_event<'de, D>(deserializer: D) -> Result<Pose, D::Error>
where
    D: Deserializer<'de>,
{
    PoseEnvelope::deserialize(deserializer).map(|envelope| envelope.data.absolute_input.into())
}
