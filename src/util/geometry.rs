//! Small 3D helpers for rig geometry.

use nalgebra::{Rotation3, Unit, Vector3};

/// Rotate a point about an axis through the origin.
///
/// The axis is normalised internally and must be non-zero. The angle is in
/// degrees, matching how rig mount positions are usually recorded.
pub fn rotate_about_axis(
    point: Vector3<f64>,
    axis: Vector3<f64>,
    angle_deg: f64,
) -> Vector3<f64> {
    let axis = Unit::new_normalize(axis);
    let rotation = Rotation3::from_axis_angle(&axis, angle_deg.to_radians());
    rotation * point
}
