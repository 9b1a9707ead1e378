//! Stage 2: animated (physics-free) pose of every particle.

use crate::core::Particle;

/// Recomputes `transform_position` and `rotation` head to leaf from the anchored head.
pub fn propagate_pose(particles: &mut [Particle]) {
    for index in 1..particles.len() {
        let Some(parent) = particles[index].parent else {
            continue;
        };
        let (parent_position, parent_rotation) = {
            let p0 = &particles[parent];
            (p0.transform_position, p0.rotation)
        };

        let particle = &mut particles[index];
        particle.transform_position = parent_position + particle.rest_offset(parent_rotation);
        particle.rotation = (parent_rotation * particle.local_rotation).normalize();
    }
}
