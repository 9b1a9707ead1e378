//! Stage 4: elasticity, stiffness, collision, freeze plane, and rigid length.

use crate::core::{BoneCollider, Particle, ParticleChain};
use crate::utils::math::{lerp, project_onto_plane};

/// Resolves every non-root particle of a chain, parents before children.
///
/// `colliders` is the shared collider storage; the chain's range selects from it.
pub fn solve_chain(
    chain: &ParticleChain,
    particles: &mut [Particle],
    colliders: &[BoneCollider],
    time_scale: f32,
) {
    let chain_colliders = chain
        .colliders
        .and_then(|range| colliders.get(range.indices()))
        .unwrap_or(&[]);
    let freeze_axis = chain.freeze_axis.axis();

    for index in 1..particles.len() {
        let Some(parent) = particles[index].parent else {
            continue;
        };
        let p0 = particles[parent];
        let particle = &mut particles[index];
        let rest_length = p0.transform_position.distance(particle.transform_position);

        let stiffness = lerp(1.0, particle.stiffness, chain.weight);
        if stiffness > 0.0 || particle.elasticity > 0.0 {
            let rest = p0.position + particle.rest_offset(p0.rotation);
            let pull = (particle.elasticity * time_scale).clamp(0.0, 1.0);
            particle.position += (rest - particle.position) * pull;

            if stiffness > 0.0 {
                let d = rest - particle.position;
                let len = d.length();
                let max_len = rest_length * (1.0 - stiffness) * 2.0;
                if len > max_len {
                    particle.position += d * ((len - max_len) / len);
                }
            }
        }

        if !chain_colliders.is_empty() {
            let radius = particle.radius * chain.object_scale;
            for collider in chain_colliders {
                particle.collided |= collider.collide(&mut particle.position, radius);
            }
        }

        if let Some(axis) = freeze_axis {
            if let Some(normal) = (p0.rotation * axis.unit()).try_normalize() {
                particle.position = project_onto_plane(particle.position, p0.position, normal);
            }
        }

        let d = p0.position - particle.position;
        let len = d.length();
        if len > 0.0 {
            particle.position += d * ((len - rest_length) / len);
        }
    }
}
