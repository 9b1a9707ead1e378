use glam::Vec3;

use crate::core::{Particle, ParticleChain};

/// Verlet integrator advancing every particle by one frame.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    pub dt: f32,
    /// Update rate used by chains without their own override.
    pub update_rate: f32,
}

impl Integrator {
    pub fn new(dt: f32, update_rate: f32) -> Self {
        Self { dt, update_rate }
    }

    /// `dt × rate` for `chain`.
    pub fn time_scale(&self, chain: &ParticleChain) -> f32 {
        self.dt * chain.update_rate.unwrap_or(self.update_rate)
    }

    /// External acceleration for this frame, with the gravity already held by the rest
    /// pose removed.
    pub fn frame_force(&self, chain: &ParticleChain) -> Vec3 {
        let fdir = chain.gravity_normalized;
        let resting = fdir * chain.rest_gravity.dot(fdir).max(0.0);
        (chain.gravity - resting + chain.force) * (chain.object_scale * self.time_scale(chain))
    }

    pub fn integrate_chain(&self, chain: &mut ParticleChain, particles: &mut [Particle]) {
        if chain.reset_pending {
            reset_to_pose(particles);
            chain.reset_pending = false;
            return;
        }

        let force = self.frame_force(chain);
        let object_move = chain.object_move;
        for particle in particles.iter_mut() {
            if particle.is_root() {
                particle.prev_position = particle.position;
                particle.position = particle.transform_position;
            } else {
                integrate_particle(particle, force, object_move);
            }
        }
    }
}

fn integrate_particle(particle: &mut Particle, force: Vec3, object_move: Vec3) {
    let velocity = particle.position - particle.prev_position;
    let rmove = object_move * particle.inertia;
    particle.prev_position = particle.position + rmove;

    let mut damping = particle.damping;
    if particle.collided {
        damping = (damping + particle.friction).min(1.0);
        particle.collided = false;
    }
    particle.position += velocity * (1.0 - damping) + force + rmove;
}

fn reset_to_pose(particles: &mut [Particle]) {
    for particle in particles {
        particle.position = particle.transform_position;
        particle.prev_position = particle.transform_position;
        particle.collided = false;
    }
}
