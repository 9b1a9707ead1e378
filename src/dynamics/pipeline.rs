//! The five ordered stages of one jiggle frame.

use std::time::Instant;

use super::anchor::{anchor_chain, prepare_collider, read_root_pose};
use super::integrator::Integrator;
use super::orientation::{derive_orientation, write_particles};
use super::parallel::{for_each_chain, for_each_mut};
use super::pose::propagate_pose;
use super::solver::solve_chain;
use crate::rig::BoneTransforms;
use crate::utils::profiling::{FrameProfile, time_stage};
use crate::world::registry::ChainRegistry;

/// Stage driver. Each stage completes for every chain before the next one starts.
#[derive(Debug, Clone, Copy)]
pub struct FramePipeline {
    pub update_rate: f32,
    parallel: bool,
}

impl FramePipeline {
    pub fn new(update_rate: f32) -> Self {
        Self {
            update_rate,
            parallel: false,
        }
    }

    /// Requests the rayon stages; ignored without the `parallel` feature.
    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled && cfg!(feature = "parallel");
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Runs a whole frame: simulation followed by write-back.
    pub fn run<B>(&self, registry: &mut ChainRegistry, bones: &mut B, dt: f32) -> FrameProfile
    where
        B: BoneTransforms + Sync + ?Sized,
    {
        let start = Instant::now();
        let mut profile = self.simulate(registry, bones, dt);
        self.write_back(registry, bones, &mut profile);
        profile.total_frame_time = start.elapsed();
        profile
    }

    /// Stages 1 to 5 up to (not including) writing the poses back.
    pub fn simulate<B>(&self, registry: &mut ChainRegistry, bones: &B, dt: f32) -> FrameProfile
    where
        B: BoneTransforms + Sync + ?Sized,
    {
        let mut profile = FrameProfile {
            chain_count: registry.chains().len(),
            particle_count: registry.live_particle_count(),
            collider_count: registry.colliders().iter().filter(|c| c.valid).count(),
            ..FrameProfile::default()
        };
        let parallel = self.parallel;
        let integrator = Integrator::new(dt, self.update_rate);
        let (chains, particles, colliders) = registry.storage_mut();
        if chains.is_empty() {
            return profile;
        }

        time_stage(&mut profile.anchor_time, || {
            for_each_chain(parallel, chains, particles, |chain, particles| {
                anchor_chain(chain, particles, bones)
            });
            for_each_mut(parallel, colliders, |collider| {
                prepare_collider(collider, bones)
            });
        });
        time_stage(&mut profile.pose_time, || {
            for_each_chain(parallel, chains, particles, |chain, particles| {
                if chain.is_simulated() {
                    propagate_pose(particles);
                }
            });
        });
        time_stage(&mut profile.integrate_time, || {
            for_each_chain(parallel, chains, particles, |chain, particles| {
                if chain.is_simulated() {
                    integrator.integrate_chain(chain, particles);
                }
            });
        });
        time_stage(&mut profile.solve_time, || {
            let colliders: &[_] = colliders;
            for_each_chain(parallel, chains, particles, |chain, particles| {
                if chain.is_simulated() {
                    solve_chain(chain, particles, colliders, integrator.time_scale(chain));
                }
            });
        });
        time_stage(&mut profile.orientation_time, || {
            for_each_chain(parallel, chains, particles, |chain, particles| {
                if chain.is_simulated() {
                    derive_orientation(particles);
                }
            });
        });

        profile.dormant_count = chains.iter().filter(|chain| chain.dormant).count();
        profile
    }

    /// Writes every awake chain's particles onto its bones, in slot order.
    ///
    /// The root pose the host reports afterwards is remembered so the next frame can tell
    /// host animation apart from its own write-back.
    pub fn write_back<B>(
        &self,
        registry: &mut ChainRegistry,
        bones: &mut B,
        profile: &mut FrameProfile,
    ) where
        B: BoneTransforms + ?Sized,
    {
        let (chains, particles, _) = registry.storage_mut();
        time_stage(&mut profile.write_back_time, || {
            for chain in chains.iter_mut().filter(|chain| chain.is_simulated()) {
                let tree = &particles[chain.particle_range()];
                write_particles(tree, bones);
                if let Some(root) = tree.first() {
                    chain.written_root_pose = read_root_pose(chain, root, bones);
                }
            }
        });
    }
}
