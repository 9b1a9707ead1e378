//! Deferred add/remove requests applied at the frame synchronization point.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::registry::ChainRegistry;
use crate::core::{BoneChain, ChainId};

#[derive(Debug, Clone)]
pub enum RegistrationEvent {
    Add(Arc<BoneChain>),
    Remove(ChainId),
}

/// Cloneable handle for enqueueing registrations from any thread.
///
/// Enqueueing never blocks on an in-flight frame; the scheduler drains the queue only
/// between frames.
#[derive(Debug, Clone, Default)]
pub struct RegistrationQueue {
    events: Arc<Mutex<VecDeque<RegistrationEvent>>>,
}

impl RegistrationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, chain: impl Into<Arc<BoneChain>>) {
        self.events
            .lock()
            .push_back(RegistrationEvent::Add(chain.into()));
    }

    pub fn unregister(&self, id: ChainId) {
        self.events.lock().push_back(RegistrationEvent::Remove(id));
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Takes every pending event in submission order.
    pub fn drain(&self) -> Vec<RegistrationEvent> {
        self.events.lock().drain(..).collect()
    }

    /// Applies pending events to `registry`; returns how many changed it.
    pub fn apply_to(&self, registry: &mut ChainRegistry) -> usize {
        self.drain()
            .into_iter()
            .filter(|event| match event {
                RegistrationEvent::Add(chain) => registry.absorb(chain),
                RegistrationEvent::Remove(id) => registry.evict(*id),
            })
            .count()
    }
}
