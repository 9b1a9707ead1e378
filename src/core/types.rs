use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, orientation, and lossy scale of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Applies another transform on top of this one, returning the composition.
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.transform_point(other.position),
            rotation: (self.rotation * other.rotation).normalize(),
            scale: self.scale * other.scale,
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }

    /// Rotates a direction without scaling or translating it.
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// Maps a world-space point into this transform's local space.
    ///
    /// Zero scale components collapse the matching local axis to zero instead of
    /// producing infinities.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        let local = self.rotation.inverse() * (point - self.position);
        local * safe_recip(self.scale)
    }
}

fn safe_recip(v: Vec3) -> Vec3 {
    let recip = |x: f32| if x == 0.0 { 0.0 } else { 1.0 / x };
    Vec3::new(recip(v.x), recip(v.y), recip(v.z))
}

/// Principal axis of a collider or freeze plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Whether a collider keeps particles out of, or inside, its volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BoundMode {
    #[default]
    Outside,
    Inside,
}

/// Plane constraint applied to every non-root particle of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FreezeAxis {
    #[default]
    None,
    X,
    Y,
    Z,
}

impl FreezeAxis {
    /// Parent-local axis whose motion is removed, if any.
    pub fn axis(self) -> Option<Axis> {
        match self {
            FreezeAxis::None => None,
            FreezeAxis::X => Some(Axis::X),
            FreezeAxis::Y => Some(Axis::Y),
            FreezeAxis::Z => Some(Axis::Z),
        }
    }
}
