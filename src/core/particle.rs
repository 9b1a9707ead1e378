use glam::{Quat, Vec3};

use crate::rig::BoneId;

/// One simulated joint of a chain.
///
/// Index 0 of a chain is its head. Every other particle points at an earlier particle
/// of the same chain through `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    /// Bone written back to. `None` for synthetic end particles.
    pub bone: Option<BoneId>,
    pub index: usize,
    pub parent: Option<usize>,
    pub child_count: u32,

    pub position: Vec3,
    pub prev_position: Vec3,
    /// World rotation: the animated rotation after pose propagation, the simulated one after
    /// orientation derivation.
    pub rotation: Quat,

    /// Rest offset from the parent bone (the end offset for end particles).
    pub local_position: Vec3,
    pub local_rotation: Quat,
    /// Lossy scale of the space `local_position` is expressed in.
    pub parent_scale: Vec3,

    pub damping: f32,
    pub elasticity: f32,
    pub stiffness: f32,
    pub inertia: f32,
    pub friction: f32,
    pub radius: f32,
    /// Accumulated rest length from the chain head.
    pub bone_length: f32,
    pub collided: bool,

    /// Animated (physics-free) position, recomputed every frame.
    pub transform_position: Vec3,
}

impl Particle {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_end(&self) -> bool {
        self.bone.is_none()
    }

    /// Offset from the parent in world units for the given parent rotation.
    pub fn rest_offset(&self, parent_rotation: Quat) -> Vec3 {
        parent_rotation * (self.local_position * self.parent_scale)
    }
}
