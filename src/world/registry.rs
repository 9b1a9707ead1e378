//! Shared contiguous storage for every active chain.

use std::collections::HashSet;

use log::debug;

use crate::config::{MAX_CHAIN_COLLIDERS, MAX_CHAIN_PARTICLES};
use crate::core::{BoneChain, BoneCollider, ChainId, ColliderRange, Particle, ParticleChain};

/// Arena of chain records, particle blocks, and collider groups.
///
/// Slot `i` of `chains` owns particles `[i * MAX_CHAIN_PARTICLES, (i + 1) * MAX_CHAIN_PARTICLES)`.
/// Collider groups are `MAX_CHAIN_COLLIDERS` wide and recycled through a LIFO free-list.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: Vec<ParticleChain>,
    particles: Vec<Particle>,
    colliders: Vec<BoneCollider>,
    collider_free: Vec<usize>,
    registered: HashSet<ChainId>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves room for `capacity` particle trees and collider groups.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chains: Vec::with_capacity(capacity),
            particles: Vec::with_capacity(capacity * MAX_CHAIN_PARTICLES),
            colliders: Vec::with_capacity(capacity * MAX_CHAIN_COLLIDERS),
            collider_free: Vec::new(),
            registered: HashSet::with_capacity(capacity),
        }
    }

    /// Copies every tree of `chain` into shared storage.
    ///
    /// Returns `false` if the chain is already registered.
    pub fn absorb(&mut self, chain: &BoneChain) -> bool {
        if !self.registered.insert(chain.id()) {
            return false;
        }

        for (tree_index, tree) in chain.trees().iter().enumerate() {
            let slot = self.chains.len();
            let mut record = tree.clone();
            record.head = slot * MAX_CHAIN_PARTICLES;

            let block = tree_index * MAX_CHAIN_PARTICLES;
            self.particles
                .extend_from_slice(&chain.particle_blocks()[block..block + MAX_CHAIN_PARTICLES]);

            record.colliders = self.claim_collider_group(chain);
            debug!(
                "absorbed chain {:?} tree {} into slot {} (colliders: {:?})",
                chain.id(),
                tree_index,
                slot,
                record.colliders
            );
            self.chains.push(record);
        }
        true
    }

    fn claim_collider_group(&mut self, chain: &BoneChain) -> Option<ColliderRange> {
        let group = chain.collider_group();
        if group.is_empty() {
            return None;
        }

        let start = match self.collider_free.pop() {
            Some(start) => {
                self.colliders[start..start + MAX_CHAIN_COLLIDERS].copy_from_slice(group);
                start
            }
            None => {
                let start = self.colliders.len();
                self.colliders.extend_from_slice(group);
                start
            }
        };
        Some(ColliderRange {
            start,
            count: chain.colliders().len(),
        })
    }

    /// Removes every tree owned by `id`, compacting storage with swap-removal.
    ///
    /// Returns `false` if the chain is not registered.
    pub fn evict(&mut self, id: ChainId) -> bool {
        if !self.registered.remove(&id) {
            return false;
        }

        let slots: Vec<usize> = (0..self.chains.len())
            .rev()
            .filter(|&slot| self.chains[slot].owner == id)
            .collect();

        for slot in slots {
            if let Some(range) = self.chains[slot].colliders {
                self.release_collider_group(range.start);
            }

            let last = self.chains.len() - 1;
            let head = slot * MAX_CHAIN_PARTICLES;
            if slot != last {
                self.particles.copy_within(
                    last * MAX_CHAIN_PARTICLES..(last + 1) * MAX_CHAIN_PARTICLES,
                    head,
                );
                self.chains.swap_remove(slot);
                self.chains[slot].head = head;
                debug!("evicted chain {id:?} from slot {slot}, moved slot {last} into it");
            } else {
                self.chains.pop();
                debug!("evicted chain {id:?} from slot {slot}");
            }
            self.particles.truncate(last * MAX_CHAIN_PARTICLES);
        }
        true
    }

    fn release_collider_group(&mut self, start: usize) {
        for collider in &mut self.colliders[start..start + MAX_CHAIN_COLLIDERS] {
            collider.invalidate();
        }
        self.collider_free.push(start);
    }

    pub fn contains(&self, id: ChainId) -> bool {
        self.registered.contains(&id)
    }

    /// Number of registered chain owners.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn chains(&self) -> &[ParticleChain] {
        &self.chains
    }

    /// Particle storage including the unused tail of each block.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn colliders(&self) -> &[BoneCollider] {
        &self.colliders
    }

    /// Slots currently holding trees of `id`, in ascending order.
    pub fn slots_of(&self, id: ChainId) -> Vec<usize> {
        (0..self.chains.len())
            .filter(|&slot| self.chains[slot].owner == id)
            .collect()
    }

    pub fn tree_particles(&self, slot: usize) -> &[Particle] {
        match self.chains.get(slot) {
            Some(chain) => &self.particles[chain.particle_range()],
            None => &[],
        }
    }

    pub fn tree_colliders(&self, slot: usize) -> &[BoneCollider] {
        match self.chains.get(slot).and_then(|chain| chain.colliders) {
            Some(range) => &self.colliders[range.indices()],
            None => &[],
        }
    }

    pub fn live_particle_count(&self) -> usize {
        self.chains.iter().map(|chain| chain.particle_count).sum()
    }

    pub fn collider_group_count(&self) -> usize {
        self.colliders.len() / MAX_CHAIN_COLLIDERS
    }

    /// Collider groups waiting to be reused, most recently freed last.
    pub fn free_collider_groups(&self) -> &[usize] {
        &self.collider_free
    }

    pub(crate) fn storage_mut(
        &mut self,
    ) -> (&mut [ParticleChain], &mut [Particle], &mut [BoneCollider]) {
        (&mut self.chains, &mut self.particles, &mut self.colliders)
    }

    /// Drops all chains and releases storage.
    pub fn clear(&mut self) {
        self.chains = Vec::new();
        self.particles = Vec::new();
        self.colliders = Vec::new();
        self.collider_free = Vec::new();
        self.registered = HashSet::new();
    }
}
