//! Stage 5: derive bone rotations from solved positions and write them back.

use crate::core::Particle;
use crate::rig::BoneTransforms;
use crate::utils::math::from_to_rotation;

/// Rotates each single-child parent so its rest offset points at its solved child.
///
/// Parents with several children keep their animated rotation.
pub fn derive_orientation(particles: &mut [Particle]) {
    for index in 1..particles.len() {
        let particle = particles[index];
        let Some(parent) = particle.parent else {
            continue;
        };
        let p0 = &mut particles[parent];
        if p0.child_count > 1 {
            continue;
        }

        let rest_direction = particle.rest_offset(p0.rotation);
        let solved_direction = particle.position - p0.position;
        p0.rotation = (from_to_rotation(rest_direction, solved_direction) * p0.rotation).normalize();
    }
}

/// Writes final poses parent first. End particles have no bone and are skipped.
pub fn write_particles<B>(particles: &[Particle], bones: &mut B)
where
    B: BoneTransforms + ?Sized,
{
    for particle in particles {
        if let Some(bone) = particle.bone {
            bones.set_world_pose(bone, particle.position, particle.rotation);
        }
    }
}
