//! Global configuration constants and scheduler settings for Jiggle Bones.

use serde::{Deserialize, Serialize};

/// Fixed particle footprint of one chain slot in shared storage.
pub const MAX_CHAIN_PARTICLES: usize = 12;

/// Fixed collider footprint of one collider group in shared storage.
pub const MAX_CHAIN_COLLIDERS: usize = 10;

/// Number of chain slots reserved up front by a new scheduler.
pub const DEFAULT_CAPACITY: usize = 64;

/// Simulation rate the per-frame delta time is normalised against (updates per second).
pub const DEFAULT_UPDATE_RATE: f32 = 60.0;

/// Default velocity damping applied to every particle.
pub const DEFAULT_DAMPING: f32 = 0.1;

/// Default pull towards the animated pose.
pub const DEFAULT_ELASTICITY: f32 = 0.1;

/// Default shape preservation.
pub const DEFAULT_STIFFNESS: f32 = 0.1;

/// Radii closer than this are treated as an untapered capsule.
pub const TAPER_EPSILON: f32 = 0.01;

/// Frame driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Chain slots to reserve storage for.
    pub capacity: usize,
    /// Default update rate for chains without their own override.
    pub update_rate: f32,
    /// Run the data-parallel stages on the rayon pool.
    pub parallel: bool,
    /// Emit a warning when a frame takes longer than this many milliseconds.
    pub frame_budget_ms: Option<f32>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            update_rate: DEFAULT_UPDATE_RATE,
            parallel: true,
            frame_budget_ms: None,
        }
    }
}

impl SchedulerConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_update_rate(mut self, update_rate: f32) -> Self {
        self.update_rate = update_rate;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_frame_budget_ms(mut self, budget_ms: f32) -> Self {
        self.frame_budget_ms = Some(budget_ms);
        self
    }
}
