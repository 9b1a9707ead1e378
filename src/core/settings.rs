//! Per-chain configuration surface.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collider::ColliderConfig;
use super::curve::ResponseCurve;
use super::types::FreezeAxis;
use crate::config::{DEFAULT_DAMPING, DEFAULT_ELASTICITY, DEFAULT_STIFFNESS};
use crate::rig::BoneId;

/// A base value optionally shaped along the chain by a response curve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvedParameter {
    pub value: f32,
    pub curve: Option<ResponseCurve>,
}

impl CurvedParameter {
    pub fn new(value: f32) -> Self {
        Self { value, curve: None }
    }

    pub fn with_curve(mut self, curve: ResponseCurve) -> Self {
        self.curve = Some(curve);
        self
    }

    /// `value × curve(normalized_length)`; the raw value when there is no usable curve or
    /// the chain has no length.
    pub fn sample(&self, bone_length: f32, total_length: f32) -> f32 {
        match &self.curve {
            Some(curve) if !curve.is_empty() && total_length > 0.0 => {
                self.value * curve.evaluate(bone_length / total_length)
            }
            _ => self.value,
        }
    }
}

/// Puts a chain to sleep while its anchor is far from a reference bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceCulling {
    pub reference: BoneId,
    pub distance: f32,
}

/// Everything needed to build a chain from a bone hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub root: Option<BoneId>,
    /// Additional roots; each becomes its own particle tree.
    pub roots: Vec<BoneId>,
    /// Bone whose axes `end_offset` is expressed in. World axes when absent.
    pub owner: Option<BoneId>,
    /// Overrides the scheduler's update rate.
    pub update_rate: Option<f32>,

    pub damping: CurvedParameter,
    pub elasticity: CurvedParameter,
    pub stiffness: CurvedParameter,
    pub inertia: CurvedParameter,
    pub friction: CurvedParameter,
    pub radius: CurvedParameter,

    pub end_length: f32,
    pub end_offset: Vec3,

    pub gravity: Vec3,
    pub force: Vec3,
    pub blend_weight: f32,
    pub freeze_axis: FreezeAxis,

    pub colliders: Vec<ColliderConfig>,
    /// Sub-trees left out of the simulation.
    pub exclusions: Vec<BoneId>,
    pub distance_culling: Option<DistanceCulling>,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            root: None,
            roots: Vec::new(),
            owner: None,
            update_rate: None,
            damping: CurvedParameter::new(DEFAULT_DAMPING),
            elasticity: CurvedParameter::new(DEFAULT_ELASTICITY),
            stiffness: CurvedParameter::new(DEFAULT_STIFFNESS),
            inertia: CurvedParameter::new(0.0),
            friction: CurvedParameter::new(0.0),
            radius: CurvedParameter::new(0.0),
            end_length: 0.0,
            end_offset: Vec3::ZERO,
            gravity: Vec3::ZERO,
            force: Vec3::ZERO,
            blend_weight: 1.0,
            freeze_axis: FreezeAxis::None,
            colliders: Vec::new(),
            exclusions: Vec::new(),
            distance_culling: None,
        }
    }
}

impl ChainSettings {
    pub fn new(root: BoneId) -> Self {
        Self {
            root: Some(root),
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: BoneId) -> Self {
        self.roots.push(root);
        self
    }

    pub fn with_owner(mut self, owner: BoneId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_update_rate(mut self, update_rate: f32) -> Self {
        self.update_rate = Some(update_rate);
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping.value = damping;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity.value = elasticity;
        self
    }

    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness.value = stiffness;
        self
    }

    pub fn with_inertia(mut self, inertia: f32) -> Self {
        self.inertia.value = inertia;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction.value = friction;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius.value = radius;
        self
    }

    pub fn with_end_length(mut self, end_length: f32) -> Self {
        self.end_length = end_length;
        self
    }

    pub fn with_end_offset(mut self, end_offset: Vec3) -> Self {
        self.end_offset = end_offset;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_force(mut self, force: Vec3) -> Self {
        self.force = force;
        self
    }

    pub fn with_blend_weight(mut self, blend_weight: f32) -> Self {
        self.blend_weight = blend_weight;
        self
    }

    pub fn with_freeze_axis(mut self, freeze_axis: FreezeAxis) -> Self {
        self.freeze_axis = freeze_axis;
        self
    }

    pub fn with_collider(mut self, collider: ColliderConfig) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn with_exclusion(mut self, bone: BoneId) -> Self {
        self.exclusions.push(bone);
        self
    }

    pub fn with_distance_culling(mut self, reference: BoneId, distance: f32) -> Self {
        self.distance_culling = Some(DistanceCulling {
            reference,
            distance,
        });
        self
    }

    /// Whether leaves (and excluded branches) get a synthetic end particle.
    pub fn wants_end_particles(&self) -> bool {
        self.end_length > 0.0 || self.end_offset != Vec3::ZERO
    }

    /// Configured roots in order, without duplicates.
    pub fn root_list(&self) -> Vec<BoneId> {
        let mut roots: Vec<BoneId> = Vec::with_capacity(1 + self.roots.len());
        for root in self.root.iter().chain(self.roots.iter()) {
            if !roots.contains(root) {
                roots.push(*root);
            }
        }
        roots
    }
}
