//! Per-chain fan-out over disjoint particle blocks.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::MAX_CHAIN_PARTICLES;
use crate::core::{Particle, ParticleChain};

/// Runs `f` once per chain with that chain's live particles.
///
/// Chains are paired with consecutive `MAX_CHAIN_PARTICLES` blocks, so no two calls
/// can alias.
pub fn for_each_chain<F>(
    parallel: bool,
    chains: &mut [ParticleChain],
    particles: &mut [Particle],
    f: F,
) where
    F: Fn(&mut ParticleChain, &mut [Particle]) + Send + Sync,
{
    let run = |(chain, block): (&mut ParticleChain, &mut [Particle])| {
        let live = chain.particle_count.min(block.len());
        f(chain, &mut block[..live]);
    };

    #[cfg(feature = "parallel")]
    if parallel {
        chains
            .par_iter_mut()
            .zip(particles.par_chunks_mut(MAX_CHAIN_PARTICLES))
            .for_each(run);
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    chains
        .iter_mut()
        .zip(particles.chunks_mut(MAX_CHAIN_PARTICLES))
        .for_each(run);
}

/// Runs `f` on every element.
pub fn for_each_mut<T, F>(parallel: bool, items: &mut [T], f: F)
where
    T: Send,
    F: Fn(&mut T) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    if parallel {
        items.par_iter_mut().for_each(f);
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    items.iter_mut().for_each(f);
}
