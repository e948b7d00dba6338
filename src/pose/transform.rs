//! Pure pose → output payload transform.
//!
//! `transform_pose` never touches shared state: the caller owns the origin and
//! the output configuration and decides what to do with the returned origin.

use serde::Serialize;

use super::euler::quaternion_to_euler_xyz;
use super::{EulerAngles, Pose, Position};
use crate::config::{IncludeOrientation, OutputAxes, OutputConfig};

/// Orientation fields attached to every output variant, filtered by `includeOrientation`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OrientationFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_rot_rad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_rot_rad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_rot_rad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_rot: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_rot: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_rot: Option<f64>,
}

/// Absolute (or transformed delta) position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionFields {
    /// Only set on `absolute_input`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement_start: Option<bool>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(flatten)]
    pub orientation: OrientationFields,
}

/// Untransformed offset from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaPosition {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    #[serde(flatten)]
    pub orientation: OrientationFields,
}

/// The output document published for one pose. Absent variants are omitted when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OutputPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_input: Option<PositionFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_input: Option<DeltaPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_transformed: Option<PositionFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_transformed: Option<PositionFields>,
}

impl OutputPayload {
    pub fn is_empty(&self) -> bool {
        self.absolute_input.is_none()
            && self.delta_input.is_none()
            && self.absolute_transformed.is_none()
            && self.delta_transformed.is_none()
    }
}

/// Result of one transform call: the payload and the origin the caller should keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOutcome {
    pub payload: OutputPayload,
    pub origin: Option<Pose>,
}

/// Compute every requested representation of `pose`.
///
/// A pose with `movement_start` set always becomes the new origin, replacing any
/// prior one. Delta variants are only produced once an origin exists; their
/// orientation is the pose's current absolute orientation, not a rotation delta.
pub fn transform_pose(
    pose: &Pose,
    config: &OutputConfig,
    prior_origin: Option<&Pose>,
) -> TransformOutcome {
    let origin = if pose.movement_start {
        Some(*pose)
    } else {
        prior_origin.copied()
    };

    let euler_rad = quaternion_to_euler_xyz(&pose.orientation);
    let orientation = orientation_fields(pose, euler_rad, &config.include_orientation);
    let formats = &config.include_formats;

    let mut payload = OutputPayload::default();

    if formats.absolute_input {
        payload.absolute_input = Some(PositionFields {
            movement_start: Some(pose.movement_start),
            x: pose.position.x,
            y: pose.position.y,
            z: pose.position.z,
            orientation,
        });
    }

    if formats.absolute_transformed {
        let p = apply_axes_and_scale(&pose.position, &config.output_axes, config.scale);
        payload.absolute_transformed = Some(PositionFields {
            movement_start: None,
            x: p.x,
            y: p.y,
            z: p.z,
            orientation,
        });
    }

    if let Some(origin) = origin.as_ref() {
        let delta = pose.position.minus(&origin.position);
        if formats.delta_input {
            payload.delta_input = Some(DeltaPosition {
                dx: delta.x,
                dy: delta.y,
                dz: delta.z,
                orientation,
            });
        }
        if formats.delta_transformed {
            let d = apply_axes_and_scale(&delta, &config.output_axes, config.scale);
            payload.delta_transformed = Some(PositionFields {
                movement_start: None,
                x: d.x,
                y: d.y,
                z: d.z,
                orientation,
            });
        }
    }

    TransformOutcome { payload, origin }
}

/// Componentwise multiply by the axis multipliers, then by the scalar scale.
fn apply_axes_and_scale(p: &Position, axes: &OutputAxes, scale: f64) -> Position {
    Position {
        x: p.x * axes.x * scale,
        y: p.y * axes.y * scale,
        z: p.z * axes.z * scale,
    }
}

fn orientation_fields(
    pose: &Pose,
    euler_rad: EulerAngles,
    include: &IncludeOrientation,
) -> OrientationFields {
    let mut fields = OrientationFields::default();
    if include.quaternion {
        fields.qx = Some(pose.orientation.x);
        fields.qy = Some(pose.orientation.y);
        fields.qz = Some(pose.orientation.z);
        fields.qw = Some(pose.orientation.w);
    }
    if include.euler_radian {
        fields.x_rot_rad = Some(euler_rad.x);
        fields.y_rot_rad = Some(euler_rad.y);
        fields.z_rot_rad = Some(euler_rad.z);
    }
    if include.euler_degree {
        let deg = euler_rad.to_degrees();
        fields.x_rot = Some(deg.x);
        fields.y_rot = Some(deg.y);
        fields.z_rot = Some(deg.z);
    }
    fields
}
