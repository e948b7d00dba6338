//! 6-DoF pose values and the pure transform engine that derives output variants.
//!
//! A [`Pose`] is produced once per incoming sample and never mutated. The
//! quaternion is the authoritative orientation; the Euler angles carried on the
//! pose are kept only as the producer reported them.

mod euler;
mod transform;

#[cfg(test)]
mod tests;

pub use euler::{quaternion_to_euler_xyz, radians_to_degrees, EulerAngles};
pub use transform::{
    transform_pose, DeltaPosition, OrientationFields, OutputPayload, PositionFields,
    TransformOutcome,
};

/// Cartesian position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Componentwise difference `self - other`.
    pub fn minus(&self, other: &Position) -> Position {
        Position {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

/// Orientation quaternion `(qx, qy, qz, qw)`. Not normalized on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One pose sample as delivered by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Start of a tracked movement; forces the origin to be reset to this pose.
    pub movement_start: bool,
    pub position: Position,
    /// Euler angles in degrees, exactly as received.
    pub reported_euler_deg: EulerAngles,
    pub orientation: Quaternion,
}

impl Pose {
    pub fn new(movement_start: bool, position: Position, orientation: Quaternion) -> Self {
        Self {
            movement_start,
            position,
            reported_euler_deg: EulerAngles::default(),
            orientation,
        }
    }

    pub fn with_reported_euler(mut self, euler_deg: EulerAngles) -> Self {
        self.reported_euler_deg = euler_deg;
        self
    }
}
