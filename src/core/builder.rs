//! Turns a bone hierarchy plus [`ChainSettings`] into flat particle trees.

use glam::{Quat, Vec3};
use log::warn;

use super::chain::{ChainId, ParticleChain};
use super::collider::BoneCollider;
use super::particle::Particle;
use super::settings::{ChainSettings, CurvedParameter};
use super::types::Transform;
use crate::config::{MAX_CHAIN_COLLIDERS, MAX_CHAIN_PARTICLES};
use crate::error::{JiggleError, Result};
use crate::rig::{BoneId, BoneTransforms};

/// A chain owner's private simulation data, ready to be registered.
///
/// Each tree occupies a fixed block of [`MAX_CHAIN_PARTICLES`] particles. The collider
/// snapshot is either empty or exactly [`MAX_CHAIN_COLLIDERS`] long.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneChain {
    id: ChainId,
    trees: Vec<ParticleChain>,
    particles: Vec<Particle>,
    colliders: Vec<BoneCollider>,
    collider_count: usize,
}

impl BoneChain {
    /// Shorthand for `ChainBuilder::new(settings, bones).build()`.
    pub fn build<B: BoneTransforms + ?Sized>(settings: &ChainSettings, bones: &B) -> Result<Self> {
        ChainBuilder::new(settings, bones).build()
    }

    pub fn id(&self) -> ChainId {
        self.id
    }

    pub fn trees(&self) -> &[ParticleChain] {
        &self.trees
    }

    /// All particle blocks, padding included.
    pub fn particle_blocks(&self) -> &[Particle] {
        &self.particles
    }

    /// The live particles of one tree.
    pub fn tree_particles(&self, tree: usize) -> &[Particle] {
        match self.trees.get(tree) {
            Some(chain) => &self.particles[chain.particle_range()],
            None => &[],
        }
    }

    pub fn particle_count(&self) -> usize {
        self.trees.iter().map(|tree| tree.particle_count).sum()
    }

    /// The padded collider group, empty when no collider is configured.
    pub fn collider_group(&self) -> &[BoneCollider] {
        &self.colliders
    }

    pub fn colliders(&self) -> &[BoneCollider] {
        &self.colliders[..self.collider_count]
    }

    pub fn is_empty(&self) -> bool {
        self.particle_count() == 0
    }
}

/// Depth-first walker producing one [`BoneChain`].
pub struct ChainBuilder<'a, B: BoneTransforms + ?Sized> {
    settings: &'a ChainSettings,
    bones: &'a B,
}

struct Visit {
    bone: Option<BoneId>,
    parent: Option<usize>,
}

impl<'a, B: BoneTransforms + ?Sized> ChainBuilder<'a, B> {
    pub fn new(settings: &'a ChainSettings, bones: &'a B) -> Self {
        Self { settings, bones }
    }

    pub fn build(self) -> Result<BoneChain> {
        self.validate().inspect_err(|err| warn!("rejecting chain: {err}"))?;

        let id = ChainId::next();
        let roots = self.settings.root_list();
        let mut trees = Vec::with_capacity(roots.len());
        let mut particles = Vec::with_capacity(roots.len() * MAX_CHAIN_PARTICLES);

        for (slot, root) in roots.into_iter().enumerate() {
            let (mut tree, tree_particles) = self
                .build_tree(id, root)
                .inspect_err(|err| warn!("rejecting chain: {err}"))?;
            tree.head = slot * MAX_CHAIN_PARTICLES;
            particles.extend_from_slice(&tree_particles);
            particles.resize((slot + 1) * MAX_CHAIN_PARTICLES, Particle::default());
            trees.push(tree);
        }

        let collider_count = self.settings.colliders.len();
        let mut colliders = Vec::new();
        if collider_count > 0 {
            colliders.reserve_exact(MAX_CHAIN_COLLIDERS);
            colliders.extend(
                self.settings
                    .colliders
                    .iter()
                    .map(|config| BoneCollider::new(*config)),
            );
            colliders.resize(MAX_CHAIN_COLLIDERS, BoneCollider::default());
        }

        Ok(BoneChain {
            id,
            trees,
            particles,
            colliders,
            collider_count,
        })
    }

    fn validate(&self) -> Result<()> {
        let s = self.settings;
        let scalars = [
            ("damping", s.damping.value),
            ("elasticity", s.elasticity.value),
            ("stiffness", s.stiffness.value),
            ("inertia", s.inertia.value),
            ("friction", s.friction.value),
            ("radius", s.radius.value),
            ("end_length", s.end_length),
            ("blend_weight", s.blend_weight),
            ("update_rate", s.update_rate.unwrap_or(0.0)),
        ];
        for (name, value) in scalars {
            finite(name, value)?;
        }
        for (name, v) in [
            ("end_offset", s.end_offset),
            ("gravity", s.gravity),
            ("force", s.force),
        ] {
            for value in v.to_array() {
                finite(name, value)?;
            }
        }

        for collider in &s.colliders {
            finite("collider.radius", collider.radius)?;
            finite("collider.radius2", collider.radius2)?;
            finite("collider.height", collider.height)?;
            for value in collider.center.to_array() {
                finite("collider.center", value)?;
            }
        }
        if let Some(culling) = &s.distance_culling {
            finite("distance_culling.distance", culling.distance)?;
        }

        let referenced = s
            .root_list()
            .into_iter()
            .chain(s.owner)
            .chain(s.colliders.iter().filter_map(|c| c.bone))
            .chain(s.distance_culling.map(|c| c.reference));
        for bone in referenced {
            if !self.bones.contains(bone) {
                return Err(JiggleError::UnknownBone(bone));
            }
        }

        if s.colliders.len() > MAX_CHAIN_COLLIDERS {
            return Err(JiggleError::ColliderCapacityExceeded {
                colliders: s.colliders.len(),
                capacity: MAX_CHAIN_COLLIDERS,
            });
        }
        Ok(())
    }

    fn build_tree(&self, owner: ChainId, root: BoneId) -> Result<(ParticleChain, Vec<Particle>)> {
        let root_world = self.world(root);
        let root_parent = self.bones.parent(root);
        let root_parent_world = root_parent.map(|p| self.world(p)).unwrap_or_default();

        let mut particles: Vec<Particle> = Vec::new();
        let mut total_length = 0.0_f32;
        let mut stack = vec![Visit {
            bone: Some(root),
            parent: None,
        }];

        while let Some(visit) = stack.pop() {
            let index = particles.len();
            let mut particle = match visit.bone {
                Some(bone) => self.bone_particle(bone),
                None => self.end_particle(&particles, visit.parent),
            };
            particle.index = index;
            particle.parent = visit.parent;

            if let Some(parent) = visit.parent {
                let parent = &mut particles[parent];
                parent.child_count += 1;
                particle.bone_length =
                    parent.bone_length + parent.position.distance(particle.position);
                total_length = total_length.max(particle.bone_length);
            }
            particles.push(particle);

            if let Some(bone) = visit.bone {
                self.push_children(&mut stack, bone, index);
            }
        }

        if particles.len() > MAX_CHAIN_PARTICLES {
            return Err(JiggleError::ChainCapacityExceeded {
                root,
                particles: particles.len(),
                capacity: MAX_CHAIN_PARTICLES,
            });
        }

        for particle in &mut particles {
            self.apply_parameters(particle, total_length);
        }

        let gravity = self.settings.gravity;
        let local_gravity = root_world.rotation.inverse() * gravity;
        let tree = ParticleChain {
            owner,
            head: 0,
            particle_count: particles.len(),
            root_parent,
            root_parent_position: root_parent_world.position,
            root_parent_rotation: root_parent_world.rotation,
            written_root_pose: None,
            local_gravity,
            rest_gravity: root_world.rotation * local_gravity,
            bone_total_length: total_length,
            bone_position: root_world.position,
            object_move: Vec3::ZERO,
            object_prev_position: root_world.position,
            object_scale: root_world.scale.x.abs(),
            weight: self.settings.blend_weight.clamp(0.0, 1.0),
            force: self.settings.force,
            gravity,
            gravity_normalized: gravity.normalize_or_zero(),
            freeze_axis: self.settings.freeze_axis,
            update_rate: self.settings.update_rate.filter(|rate| *rate > 0.0),
            colliders: None,
            culling: self.settings.distance_culling,
            dormant: false,
            reset_pending: false,
        };
        Ok((tree, particles))
    }

    /// Pushes children in reverse so they pop in hierarchy order.
    fn push_children(&self, stack: &mut Vec<Visit>, bone: BoneId, index: usize) {
        let wants_end = self.settings.wants_end_particles();
        let children = self.bones.children(bone);

        if children.is_empty() && wants_end {
            stack.push(Visit {
                bone: None,
                parent: Some(index),
            });
            return;
        }
        for &child in children.iter().rev() {
            if !self.settings.exclusions.contains(&child) {
                stack.push(Visit {
                    bone: Some(child),
                    parent: Some(index),
                });
            } else if wants_end {
                stack.push(Visit {
                    bone: None,
                    parent: Some(index),
                });
            }
        }
    }

    fn bone_particle(&self, bone: BoneId) -> Particle {
        let world = self.world(bone);
        let local = self.bones.local_transform(bone).unwrap_or_default();
        let parent_scale = self
            .bones
            .parent(bone)
            .map(|parent| self.bones.lossy_scale(parent))
            .unwrap_or(Vec3::ONE);

        Particle {
            bone: Some(bone),
            position: world.position,
            prev_position: world.position,
            transform_position: world.position,
            rotation: world.rotation,
            local_position: local.position,
            local_rotation: local.rotation,
            parent_scale,
            ..Particle::default()
        }
    }

    /// Synthetic particle extending the parent bone by the configured end length or offset.
    fn end_particle(&self, particles: &[Particle], parent: Option<usize>) -> Particle {
        let parent_bone = parent.and_then(|p| particles[p].bone);
        let pb = parent_bone.map(|b| self.world(b)).unwrap_or_default();

        let end_length = self.settings.end_length;
        let end_offset = if end_length > 0.0 {
            match parent_bone.and_then(|b| self.bones.parent(b)) {
                Some(grandparent) => {
                    let ppb = self.world(grandparent);
                    pb.inverse_transform_point(pb.position * 2.0 - ppb.position) * end_length
                }
                None => Vec3::new(end_length, 0.0, 0.0),
            }
        } else {
            let owner = self
                .settings
                .owner
                .map(|owner| self.world(owner))
                .unwrap_or_default();
            pb.inverse_transform_point(owner.transform_direction(self.settings.end_offset) + pb.position)
        };

        let position = pb.transform_point(end_offset);
        Particle {
            bone: None,
            position,
            prev_position: position,
            transform_position: position,
            rotation: pb.rotation,
            local_position: end_offset,
            local_rotation: Quat::IDENTITY,
            parent_scale: pb.scale,
            ..Particle::default()
        }
    }

    fn apply_parameters(&self, particle: &mut Particle, total_length: f32) {
        let s = self.settings;
        let at = |param: &CurvedParameter| {
            param.sample(particle.bone_length, total_length)
        };
        let damping = at(&s.damping).clamp(0.0, 1.0);
        let elasticity = at(&s.elasticity).clamp(0.0, 1.0);
        let stiffness = at(&s.stiffness).clamp(0.0, 1.0);
        let inertia = at(&s.inertia).clamp(0.0, 1.0);
        let friction = at(&s.friction).clamp(0.0, 1.0);
        let radius = at(&s.radius).max(0.0);

        particle.damping = damping;
        particle.elasticity = elasticity;
        particle.stiffness = stiffness;
        particle.inertia = inertia;
        particle.friction = friction;
        particle.radius = radius;
    }

    fn world(&self, bone: BoneId) -> Transform {
        self.bones.world_transform(bone).unwrap_or_default()
    }
}

fn finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(JiggleError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collider::ColliderConfig;
    use crate::core::curve::ResponseCurve;
    use crate::rig::Skeleton;
    use approx::assert_abs_diff_eq;

    fn strand(count: usize) -> (Skeleton, Vec<BoneId>) {
        let mut skeleton = Skeleton::new();
        let ids = skeleton.add_strand(
            "hair",
            None,
            Transform::IDENTITY,
            Vec3::new(0.0, -1.0, 0.0),
            count,
        );
        (skeleton, ids)
    }

    #[test]
    fn end_length_extends_last_bone() {
        let (skeleton, ids) = strand(3);
        let settings = ChainSettings::new(ids[0]).with_end_length(0.5);
        let chain = BoneChain::build(&settings, &skeleton).expect("build");

        let particles = chain.tree_particles(0);
        assert_eq!(particles.len(), 4);
        let end = particles[3];
        assert!(end.is_end());
        assert_eq!(end.parent, Some(2));
        assert!(end.position.abs_diff_eq(Vec3::new(0.0, -2.5, 0.0), 1e-5));
        assert_abs_diff_eq!(end.bone_length, 2.5, epsilon = 1e-5);
    }

    #[test]
    fn curves_scale_parameters_along_length() {
        let (skeleton, ids) = strand(3);
        let mut settings = ChainSettings::new(ids[0]).with_damping(0.8);
        settings.damping = settings.damping.with_curve(ResponseCurve::linear(1.0, 0.0));
        let chain = BoneChain::build(&settings, &skeleton).expect("build");

        let particles = chain.tree_particles(0);
        assert_abs_diff_eq!(particles[0].damping, 0.8, epsilon = 1e-5);
        assert_abs_diff_eq!(particles[1].damping, 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(particles[2].damping, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn parameters_are_clamped() {
        let (skeleton, ids) = strand(2);
        let settings = ChainSettings::new(ids[0])
            .with_stiffness(3.0)
            .with_radius(-1.0)
            .with_friction(2.0);
        let chain = BoneChain::build(&settings, &skeleton).expect("build");
        let particle = chain.tree_particles(0)[1];
        assert_eq!(particle.stiffness, 1.0);
        assert_eq!(particle.radius, 0.0);
        assert_eq!(particle.friction, 1.0);
    }

    #[test]
    fn nan_parameter_is_rejected() {
        let (skeleton, ids) = strand(2);
        let settings = ChainSettings::new(ids[0]).with_gravity(Vec3::new(0.0, f32::NAN, 0.0));
        let err = BoneChain::build(&settings, &skeleton).unwrap_err();
        assert!(matches!(
            err,
            JiggleError::InvalidParameter { name: "gravity", .. }
        ));
    }

    #[test]
    fn collider_group_is_padded() {
        let (skeleton, ids) = strand(2);
        let settings = ChainSettings::new(ids[0]).with_collider(ColliderConfig::sphere(0.2));
        let chain = BoneChain::build(&settings, &skeleton).expect("build");
        assert_eq!(chain.colliders().len(), 1);
        assert_eq!(chain.collider_group().len(), MAX_CHAIN_COLLIDERS);
        assert!(chain.colliders()[0].valid);
        assert!(!chain.collider_group()[1].valid);
    }

    #[test]
    fn no_root_builds_an_empty_chain() {
        let (skeleton, _) = strand(2);
        let chain = BoneChain::build(&ChainSettings::default(), &skeleton).expect("build");
        assert!(chain.is_empty());
        assert!(chain.trees().is_empty());
    }
}
