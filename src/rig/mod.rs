//! Bridge to the host's transform hierarchy.
//!
//! The solver never owns bones. It reads rest poses and root anchors through
//! [`BoneTransforms`] and writes simulated poses back through the same trait.

pub mod skeleton;

pub use skeleton::Skeleton;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::types::Transform;

/// Handle of a bone inside the host hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoneId(pub u32);

impl BoneId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Transform hierarchy the solver reads from and writes to.
pub trait BoneTransforms {
    fn contains(&self, bone: BoneId) -> bool;

    fn parent(&self, bone: BoneId) -> Option<BoneId>;

    /// Direct children in hierarchy order.
    fn children(&self, bone: BoneId) -> &[BoneId];

    /// World-space pose. The scale is the lossy (accumulated) scale.
    fn world_transform(&self, bone: BoneId) -> Option<Transform>;

    /// Pose relative to the parent bone.
    fn local_transform(&self, bone: BoneId) -> Option<Transform>;

    /// Writes a simulated world pose. Descendants follow the bone.
    fn set_world_pose(&mut self, bone: BoneId, position: Vec3, rotation: Quat);

    fn lossy_scale(&self, bone: BoneId) -> Vec3 {
        self.world_transform(bone)
            .map(|transform| transform.scale)
            .unwrap_or(Vec3::ONE)
    }
}
