//! Stage 1: read the root parents and colliders from the host hierarchy.

use glam::{Quat, Vec3};
use log::trace;

use crate::core::{BoneCollider, Particle, ParticleChain, Transform};
use crate::rig::BoneTransforms;

/// Anchors the chain head to its root parent and derives the per-frame chain state.
///
/// A root parent that cannot be read keeps its last known transform.
pub fn anchor_chain<B>(chain: &mut ParticleChain, particles: &mut [Particle], bones: &B)
where
    B: BoneTransforms + ?Sized,
{
    let Some(root) = particles.first_mut() else {
        return;
    };

    if let Some(parent) = chain.root_parent.and_then(|bone| bones.world_transform(bone)) {
        chain.root_parent_position = parent.position;
        chain.root_parent_rotation = parent.rotation;
    }
    // A pose equal to the last write-back means the host has not touched the bone since.
    if let Some(pose) = read_root_pose(chain, root, bones) {
        if chain.written_root_pose != Some(pose) {
            (root.local_position, root.local_rotation) = pose;
        }
    }

    let anchor = chain.root_parent_position + root.rest_offset(chain.root_parent_rotation);
    let rotation = (chain.root_parent_rotation * root.local_rotation).normalize();
    root.transform_position = anchor;
    root.rotation = rotation;

    chain.bone_position = anchor;
    chain.object_move = anchor - chain.object_prev_position;
    chain.object_prev_position = anchor;
    chain.rest_gravity = rotation * chain.local_gravity;

    update_culling(chain, bones);
}

/// The root bone's current pose relative to its parent, or its world pose without one.
pub fn read_root_pose<B>(
    chain: &ParticleChain,
    root: &Particle,
    bones: &B,
) -> Option<(Vec3, Quat)>
where
    B: BoneTransforms + ?Sized,
{
    let bone = root.bone?;
    let pose = match chain.root_parent {
        Some(_) => bones.local_transform(bone)?,
        None => bones.world_transform(bone)?,
    };
    Some((pose.position, pose.rotation))
}

fn update_culling<B>(chain: &mut ParticleChain, bones: &B)
where
    B: BoneTransforms + ?Sized,
{
    let Some(culling) = chain.culling else {
        return;
    };
    let Some(reference) = bones.world_transform(culling.reference) else {
        return;
    };

    let dormant = chain.bone_position.distance(reference.position) > culling.distance;
    if chain.dormant && !dormant {
        trace!("chain {:?} woke up, resetting to the animated pose", chain.owner);
        chain.reset_pending = true;
    }
    chain.dormant = dormant;
}

/// Bakes a collider against its bone's current world transform.
pub fn prepare_collider<B>(collider: &mut BoneCollider, bones: &B)
where
    B: BoneTransforms + ?Sized,
{
    if !collider.valid {
        return;
    }
    match collider.bone() {
        Some(bone) => match bones.world_transform(bone) {
            Some(world) => collider.prepare(&world),
            None => collider.mark_stale(),
        },
        None => collider.prepare(&Transform::IDENTITY),
    }
}
