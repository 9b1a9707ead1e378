use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::settings::DistanceCulling;
use super::types::FreezeAxis;
use crate::rig::BoneId;

static NEXT_CHAIN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a chain owner, used to register and unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CHAIN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Window into the shared collider storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderRange {
    pub start: usize,
    pub count: usize,
}

impl ColliderRange {
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.count
    }
}

/// Per-tree record of one registered bone hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleChain {
    pub owner: ChainId,
    /// First particle of this tree in the particle storage it lives in.
    pub head: usize,
    pub particle_count: usize,
    pub root_parent: Option<BoneId>,

    pub root_parent_position: Vec3,
    pub root_parent_rotation: Quat,
    /// Root pose as the host reported it right after the last write-back, in the space
    /// the root is read in (parent space, or world space for a parentless root).
    pub written_root_pose: Option<(Vec3, Quat)>,

    /// Gravity expressed in the root's rest frame, baked at build time.
    pub local_gravity: Vec3,
    /// `local_gravity` re-expressed in the current root orientation.
    pub rest_gravity: Vec3,
    pub bone_total_length: f32,

    pub bone_position: Vec3,
    pub object_move: Vec3,
    pub object_prev_position: Vec3,
    pub object_scale: f32,

    pub weight: f32,
    pub force: Vec3,
    pub gravity: Vec3,
    pub gravity_normalized: Vec3,
    pub freeze_axis: FreezeAxis,
    pub update_rate: Option<f32>,

    /// `None` when the owner has no colliders.
    pub colliders: Option<ColliderRange>,

    pub culling: Option<DistanceCulling>,
    pub dormant: bool,
    pub reset_pending: bool,
}

impl ParticleChain {
    pub fn particle_range(&self) -> std::ops::Range<usize> {
        self.head..self.head + self.particle_count
    }

    pub fn is_simulated(&self) -> bool {
        self.particle_count > 0 && !self.dormant
    }
}
