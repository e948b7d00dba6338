use super::*;
use serde_json::json;

#[test]
fn split_handles_concatenated_objects() {
    let values = split_event_line(r#"{"type":"a"}{"type":"b"}"#);
    assert_eq!(values, vec![json!({"type": "a"}), json!({"type": "b"})]);
}

#[test]
fn split_trims_whitespace_around_fragments() {
    let values = split_event_line("  {\"type\":\"heartbeat\"}  \r\n");
    assert_eq!(values, vec![json!({"type": "heartbeat"})]);
}

#[test]
fn split_discards_non_json_without_affecting_siblings() {
    assert!(split_event_line("▄▄▄▄▄▄▄ ▄ ▄▄ QR").is_empty());
    assert!(split_event_line("").is_empty());

    let values = split_event_line(r#"{"type":"a"}{not json}{"type":"c"}"#);
    assert_eq!(values, vec![json!({"type": "a"}), json!({"type": "c"})]);
}

#[test]
fn split_cuts_at_every_boundary_even_inside_nested_values() {
    // Nested objects joined by `}{` are cut too; both halves fail to parse.
    let values = split_event_line(r#"{"outer":{"a":1}{"b":2}}"#);
    assert!(values.is_empty());
}

#[test]
fn parse_maps_types_to_events() {
    let events = parse_event_line(r#"{"type":"heartbeat"}{"type":"wifi_connected"}"#);
    assert_eq!(
        events,
        vec![ProducerEvent::Heartbeat, ProducerEvent::WifiConnected]
    );
}

#[test]
fn unknown_type_is_kept_as_unknown() {
    let events = parse_event_line(r#"{"type":"battery_level","value":42}"#);
    assert_eq!(events, vec![ProducerEvent::Unknown]);
    assert_eq!(events[0].class(), EventClass::Ignored);
}

#[test]
fn object_without_type_is_dropped() {
    assert!(parse_event_line(r#"{"x":1}"#).is_empty());
}

#[test]
fn known_type_with_bad_payload_is_dropped() {
    assert!(parse_event_line(r#"{"type":"session","port":"not-a-port"}"#).is_empty());
}

#[test]
fn pose_defaults_missing_fields() {
    let events = parse_event_line(r#"{"type":"pose","data":{"absolute_input":{"x":0.5}}}"#);
    let ProducerEvent::Pose(pose) = &events[0] else {
        panic!("expected pose, got {events:?}");
    };
    assert!(!pose.movement_start);
    assert_eq!(pose.position.x, 0.5);
    assert_eq!(pose.position.y, 0.0);
    assert_eq!(pose.orientation.w, 1.0);
    assert_eq!(pose.orientation.x, 0.0);
}

#[test]
fn pose_without_data_is_identity_at_origin() {
    let events = parse_event_line(r#"{"type":"pose"}"#);
    let ProducerEvent::Pose(pose) = &events[0] else {
        panic!("expected pose, got {events:?}");
    };
    assert_eq!(pose.position.z, 0.0);
    assert_eq!(pose.orientation.w, 1.0);
}

#[test]
fn pose_start_and_movement_start_both_set_marker() {
    for field in ["pose_start", "movement_start"] {
        let line = format!(r#"{{"type":"pose","data":{{"absolute_input":{{"{field}":true}}}}}}"#);
        let events = parse_event_line(&line);
        let ProducerEvent::Pose(pose) = &events[0] else {
            panic!("expected pose for {field}");
        };
        assert!(pose.movement_start, "{field} should mark movement start");
    }
}

#[test]
fn pose_keeps_reported_euler_angles() {
    let events = parse_event_line(
        r#"{"type":"pose","data":{"absolute_input":{"x_rot":10,"y_rot":-20,"z_rot":30.5}}}"#,
    );
    let ProducerEvent::Pose(pose) = &events[0] else {
        panic!("expected pose");
    };
    assert_eq!(pose.reported_euler_deg.x, 10.0);
    assert_eq!(pose.reported_euler_deg.y, -20.0);
    assert_eq!(pose.reported_euler_deg.z, 30.5);
}

#[test]
fn session_port_accepts_number_or_string() {
    let events = parse_event_line(
        r#"{"type":"session","name":"voodoo","ip":"10.0.0.2","port":50000}{"type":"server_listening","ip":"0.0.0.0","port":"50001"}"#,
    );
    assert_eq!(
        events[0],
        ProducerEvent::Session(SessionFields {
            name: Some("voodoo".to_string()),
            ip: Some("10.0.0.2".to_string()),
            port: Some(50000),
            ..SessionFields::default()
        })
    );
    assert_eq!(
        events[1],
        ProducerEvent::ServerListening(EndpointFields {
            ip: Some("0.0.0.0".to_string()),
            port: Some(50001),
        })
    );
}

#[test]
fn legacy_and_unified_names_share_a_class() {
    let cases = [
        ("connected", EventClass::Liveness),
        ("wifi_connected", EventClass::Liveness),
        ("usb_connected", EventClass::Liveness),
        ("ble_auth_ok", EventClass::Liveness),
        ("ble_control", EventClass::Liveness),
        ("heartbeat", EventClass::Liveness),
        ("disconnected", EventClass::Disconnect),
        ("wifi_disconnected", EventClass::Disconnect),
        ("usb_disconnected", EventClass::Disconnect),
        ("session_rejected", EventClass::Rejection),
        ("ble_auth_failed", EventClass::Rejection),
        ("service_heartbeat", EventClass::Informational),
        ("mdns_registered", EventClass::Informational),
        ("resampling_enabled", EventClass::Informational),
        ("warn", EventClass::Informational),
        ("error", EventClass::Informational),
    ];
    for (name, class) in cases {
        let events = parse_event_line(&format!(r#"{{"type":"{name}"}}"#));
        assert_eq!(events.len(), 1, "{name} should parse");
        assert_eq!(events[0].class(), class, "{name}");
        assert_eq!(events[0].name(), name);
    }
}

#[test]
fn message_fields_are_optional() {
    let events = parse_event_line(r#"{"type":"warn"}{"type":"error","message":"bind failed"}"#);
    assert_eq!(events[0], ProducerEvent::Warn(MessageFields { message: None }));
    assert_eq!(
        events[1],
        ProducerEvent::Error(MessageFields {
            message: Some("bind failed".to_string())
        })
    );
}

#[test]
fn ble_state_carries_state_string() {
    let events = parse_event_line(r#"{"type":"ble_state","state":"poweredOn"}"#);
    assert_eq!(
        events,
        vec![ProducerEvent::BleState(BleStateFields {
            state: Some("poweredOn".to_string())
        })]
    );
}

#[test]
fn ble_state_accepts_integer_state() {
    let events = parse_event_line(r#"{"type":"ble_state","state":5}"#);
    assert_eq!(
        events,
        vec![ProducerEvent::BleState(BleStateFields {
            state: Some("5".to_string())
        })]
    );
}

#[test]
fn pose_null_or_mistyped_numbers_fall_back_to_defaults() {
    let events = parse_event_line(
        r#"{"type":"pose","data":{"absolute_input":{"x":null,"y":"oops","z":2,"qw":null,"movement_start":true}}}"#,
    );
    let ProducerEvent::Pose(pose) = &events[0] else {
        panic!("expected pose, got {events:?}");
    };
    assert!(pose.movement_start);
    assert_eq!(pose.position.x, 0.0);
    assert_eq!(pose.position.y, 0.0);
    assert_eq!(pose.position.z, 2.0);
    assert_eq!(pose.orientation.w, 1.0);
}
