//! Small math helpers layered on top of `glam`.

use glam::{Quat, Vec3};

/// Shortest rotation taking `from` onto `to`. Identity when either vector is degenerate.
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    match (from.try_normalize(), to.try_normalize()) {
        (Some(from), Some(to)) => Quat::from_rotation_arc(from, to),
        _ => Quat::IDENTITY,
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Removes the component of `point - origin` along `normal`. `normal` must be unit length.
pub fn project_onto_plane(point: Vec3, origin: Vec3, normal: Vec3) -> Vec3 {
    point - normal * normal.dot(point - origin)
}
