use super::Quaternion;

/// Rotation about the X, Y and Z axes. Units depend on context.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EulerAngles {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_degrees(self) -> EulerAngles {
        EulerAngles {
            x: radians_to_degrees(self.x),
            y: radians_to_degrees(self.y),
            z: radians_to_degrees(self.z),
        }
    }

    pub fn to_radians(self) -> EulerAngles {
        EulerAngles {
            x: self.x.to_radians(),
            y: self.y.to_radians(),
            z: self.z.to_radians(),
        }
    }
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Threshold on the `m13` matrix term above which the XYZ decomposition is in gimbal lock.
const GIMBAL_LOCK_THRESHOLD: f64 = 0.999_999_9;

/// Decompose a quaternion into intrinsic XYZ Euler angles (radians).
///
/// Goes through the rotation matrix, the same decomposition three.js uses for
/// `Euler.setFromQuaternion(q, "XYZ")`. The quaternion is used as given.
pub fn quaternion_to_euler_xyz(q: &Quaternion) -> EulerAngles {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);

    let m11 = 1.0 - 2.0 * (y * y + z * z);
    let m12 = 2.0 * (x * y - z * w);
    let m13 = 2.0 * (x * z + y * w);
    let m22 = 1.0 - 2.0 * (x * x + z * z);
    let m23 = 2.0 * (y * z - x * w);
    let m32 = 2.0 * (y * z + x * w);
    let m33 = 1.0 - 2.0 * (x * x + y * y);

    // asin is undefined outside [-1, 1]; rounding can push m13 slightly past it.
    let pitch = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < GIMBAL_LOCK_THRESHOLD {
        EulerAngles {
            x: (-m23).atan2(m33),
            y: pitch,
            z: (-m12).atan2(m11),
        }
    } else {
        EulerAngles {
            x: m32.atan2(m22),
            y: pitch,
            z: 0.0,
        }
    }
}
