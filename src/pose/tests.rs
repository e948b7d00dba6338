use super::*;
use crate::config::{IncludeFormats, IncludeOrientation, OutputAxes, OutputConfig};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const EPS: f64 = 1e-12;

fn pose(movement_start: bool, x: f64, y: f64, z: f64) -> Pose {
    Pose::new(movement_start, Position::new(x, y, z), Quaternion::IDENTITY)
}

fn all_formats() -> OutputConfig {
    OutputConfig {
        include_formats: IncludeFormats {
            absolute_input: true,
            delta_input: true,
            absolute_transformed: true,
            delta_transformed: true,
        },
        ..OutputConfig::default()
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn mirrored_scaled_scenario() {
    let config = OutputConfig {
        output_axes: OutputAxes {
            x: 1.0,
            y: -1.0,
            z: 1.0,
        },
        scale: 2.0,
        ..all_formats()
    };

    let first = pose(true, 1.0, 2.0, 3.0);
    let outcome = transform_pose(&first, &config, None);
    let abs = outcome.payload.absolute_transformed.expect("absolute_transformed");
    assert_eq!((abs.x, abs.y, abs.z), (2.0, -4.0, 6.0));
    assert_eq!(outcome.origin, Some(first));

    let second = pose(false, 2.0, 2.0, 3.0);
    let next = transform_pose(&second, &config, outcome.origin.as_ref());
    let delta = next.payload.delta_input.expect("delta_input");
    assert_eq!((delta.dx, delta.dy, delta.dz), (1.0, 0.0, 0.0));
    let delta_t = next.payload.delta_transformed.expect("delta_transformed");
    assert_eq!((delta_t.x, delta_t.y, delta_t.z), (2.0, 0.0, 0.0));
    assert_eq!(next.origin, Some(first));
}

#[test]
fn movement_start_always_overwrites_origin() {
    let config = all_formats();
    let prior = pose(true, 5.0, 5.0, 5.0);
    let restart = pose(true, 1.0, 1.0, 1.0);
    let outcome = transform_pose(&restart, &config, Some(&prior));
    assert_eq!(outcome.origin, Some(restart));
    let delta = outcome.payload.delta_input.expect("delta against new origin");
    assert_eq!((delta.dx, delta.dy, delta.dz), (0.0, 0.0, 0.0));
}

#[test]
fn deltas_absent_without_origin_even_when_requested() {
    let outcome = transform_pose(&pose(false, 1.0, 1.0, 1.0), &all_formats(), None);
    assert!(outcome.origin.is_none());
    assert!(outcome.payload.delta_input.is_none());
    assert!(outcome.payload.delta_transformed.is_none());
    assert!(outcome.payload.absolute_input.is_some());
    assert!(outcome.payload.absolute_transformed.is_some());
}

#[test]
fn deltas_absent_when_flags_off() {
    let origin = pose(true, 0.0, 0.0, 0.0);
    let outcome = transform_pose(
        &pose(false, 1.0, 0.0, 0.0),
        &OutputConfig::default(),
        Some(&origin),
    );
    assert!(outcome.payload.delta_input.is_none());
    assert!(outcome.payload.delta_transformed.is_none());
}

#[test]
fn disabled_formats_are_omitted_from_json() {
    let config = OutputConfig {
        include_formats: IncludeFormats {
            absolute_input: false,
            delta_input: false,
            absolute_transformed: true,
            delta_transformed: false,
        },
        ..OutputConfig::default()
    };
    let outcome = transform_pose(&pose(true, 1.0, 2.0, 3.0), &config, None);
    let json = serde_json::to_value(outcome.payload).expect("serialize payload");
    let keys: Vec<_> = json.as_object().expect("object").keys().cloned().collect();
    assert_eq!(keys, vec!["absolute_transformed".to_string()]);
}

#[test]
fn transform_is_idempotent() {
    let config = all_formats();
    let origin = pose(true, 0.25, -1.0, 2.0);
    let sample = Pose::new(
        false,
        Position::new(0.1, 0.2, 0.3),
        Quaternion::new(0.1, 0.2, 0.3, 0.927_361_8),
    );
    let a = transform_pose(&sample, &config, Some(&origin));
    let b = transform_pose(&sample, &config, Some(&origin));
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a.payload).expect("serialize"),
        serde_json::to_string(&b.payload).expect("serialize")
    );
}

#[test]
fn absolute_input_carries_raw_position_and_marker() {
    let outcome = transform_pose(&pose(true, 1.5, -2.5, 0.0), &OutputConfig::default(), None);
    let abs = outcome.payload.absolute_input.expect("absolute_input");
    assert_eq!(abs.movement_start, Some(true));
    assert_eq!((abs.x, abs.y, abs.z), (1.5, -2.5, 0.0));
    let json = serde_json::to_value(outcome.payload).expect("serialize");
    assert_eq!(json["absolute_input"]["movement_start"], true);
    assert!(json["absolute_transformed"].get("movement_start").is_none());
}

#[test]
fn orientation_subsets_are_independent() {
    let rotated = Pose::new(
        false,
        Position::default(),
        Quaternion::new(0.0, 0.0, FRAC_PI_4.sin(), FRAC_PI_4.cos()),
    );

    let only_quat = transform_pose(&rotated, &OutputConfig::default(), None);
    let fields = only_quat.payload.absolute_input.expect("abs").orientation;
    assert!(fields.qw.is_some());
    assert!(fields.x_rot_rad.is_none());
    assert!(fields.x_rot.is_none());

    let everything = OutputConfig {
        include_orientation: IncludeOrientation {
            quaternion: true,
            euler_radian: true,
            euler_degree: true,
        },
        ..OutputConfig::default()
    };
    let fields = transform_pose(&rotated, &everything, None)
        .payload
        .absolute_input
        .expect("abs")
        .orientation;
    assert_close(fields.qz.expect("qz"), FRAC_PI_4.sin());
    assert_close(fields.z_rot_rad.expect("z rad"), FRAC_PI_2);
    assert_close(fields.z_rot.expect("z deg"), 90.0);

    let none = OutputConfig {
        include_orientation: IncludeOrientation {
            quaternion: false,
            euler_radian: false,
            euler_degree: false,
        },
        ..OutputConfig::default()
    };
    let json = serde_json::to_value(transform_pose(&rotated, &none, None).payload)
        .expect("serialize");
    let abs = json["absolute_input"].as_object().expect("object");
    assert!(!abs.contains_key("qx"));
    assert!(!abs.contains_key("x_rot"));
    assert!(!abs.contains_key("x_rot_rad"));
}

#[test]
fn delta_orientation_is_current_absolute_orientation() {
    let q = Quaternion::new(0.0, FRAC_PI_4.sin(), 0.0, FRAC_PI_4.cos());
    let origin = pose(true, 0.0, 0.0, 0.0);
    let sample = Pose::new(false, Position::new(1.0, 0.0, 0.0), q);
    let payload = transform_pose(&sample, &all_formats(), Some(&origin)).payload;
    let delta = payload.delta_input.expect("delta");
    assert_eq!(delta.orientation.qy, Some(q.y));
    assert_eq!(delta.orientation.qw, Some(q.w));
}

#[test]
fn zero_scale_collapses_transformed_position() {
    let config = OutputConfig {
        scale: 0.0,
        ..all_formats()
    };
    let origin = pose(true, 1.0, 1.0, 1.0);
    let payload = transform_pose(&pose(false, 4.0, -3.0, 2.0), &config, Some(&origin)).payload;
    let abs = payload.absolute_transformed.expect("abs");
    assert_eq!((abs.x.abs(), abs.y.abs(), abs.z.abs()), (0.0, 0.0, 0.0));
    let delta = payload.delta_transformed.expect("delta");
    assert_eq!((delta.x.abs(), delta.y.abs(), delta.z.abs()), (0.0, 0.0, 0.0));
}

#[test]
fn identity_quaternion_has_zero_euler() {
    let euler = quaternion_to_euler_xyz(&Quaternion::IDENTITY);
    assert_eq!(euler, EulerAngles::new(0.0, 0.0, 0.0));
}

#[test]
fn single_axis_rotations_decompose_cleanly() {
    // half-angle of a 45 degree rotation
    let half = FRAC_PI_4 / 2.0;
    let about_x = quaternion_to_euler_xyz(&Quaternion::new(half.sin(), 0.0, 0.0, half.cos()));
    assert_close(about_x.x, FRAC_PI_4);
    assert_close(about_x.y, 0.0);
    assert_close(about_x.z, 0.0);

    let about_y = quaternion_to_euler_xyz(&Quaternion::new(0.0, half.sin(), 0.0, half.cos()));
    assert_close(about_y.y, FRAC_PI_4);

    let about_z = quaternion_to_euler_xyz(&Quaternion::new(0.0, 0.0, half.sin(), half.cos()));
    assert_close(about_z.z, FRAC_PI_4);
}

#[test]
fn gimbal_lock_zeroes_z() {
    // +90 degrees about Y puts m13 at 1.
    let q = Quaternion::new(0.0, FRAC_PI_4.sin(), 0.0, FRAC_PI_4.cos());
    let euler = quaternion_to_euler_xyz(&q);
    assert_close(euler.y, FRAC_PI_2);
    assert_eq!(euler.z, 0.0);
    assert!(euler.x.is_finite());
}

#[test]
fn degree_conversion_matches_formula() {
    assert!((radians_to_degrees(std::f64::consts::PI) - 180.0).abs() < EPS);
    let deg = EulerAngles::new(FRAC_PI_2, -FRAC_PI_4, 0.0).to_degrees();
    assert!((deg.x - 90.0).abs() < EPS);
    assert!((deg.y + 45.0).abs() < EPS);
    let back = deg.to_radians();
    assert!((back.x - FRAC_PI_2).abs() < EPS);
}

#[test]
fn reported_euler_is_kept_but_not_used_for_math() {
    let sample = pose(false, 0.0, 0.0, 0.0).with_reported_euler(EulerAngles::new(10.0, 20.0, 30.0));
    let config = OutputConfig {
        include_orientation: IncludeOrientation {
            quaternion: false,
            euler_radian: false,
            euler_degree: true,
        },
        ..OutputConfig::default()
    };
    let fields = transform_pose(&sample, &config, None)
        .payload
        .absolute_input
        .expect("abs")
        .orientation;
    assert_eq!(sample.reported_euler_deg.z, 30.0);
    assert_eq!(fields.z_rot, Some(0.0));
}
