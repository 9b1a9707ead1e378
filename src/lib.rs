//! Jiggle Bones – secondary-motion solver for skeletal bone chains.
//!
//! Chains of bones (hair, tails, cloth strips) are converted into particle trees,
//! registered into shared storage, and advanced once per frame by a five-stage
//! pipeline: root anchoring, pose propagation, verlet integration, constraint and
//! collision resolution, then orientation derivation and write-back.

pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod rig;
pub mod utils;
pub mod world;

pub use glam::{Quat, Vec3};

pub use config::SchedulerConfig;
pub use crate::core::{
    Axis, BoneChain, BoneCollider, BoundMode, ChainBuilder, ChainId, ChainSettings, ColliderConfig,
    CurvedParameter, DistanceCulling, FreezeAxis, Keyframe, Particle, ParticleChain,
    PreparedShape, ResponseCurve, Transform,
};
pub use dynamics::FramePipeline;
pub use error::{JiggleError, Result};
pub use rig::{BoneId, BoneTransforms, Skeleton};
pub use utils::profiling::FrameProfile;
pub use world::{ChainRegistry, FrameScheduler, FrameStatus, RegistrationEvent, RegistrationQueue};
