//! Core data: particles, chains, colliders, and the builder that produces them.

pub mod builder;
pub mod chain;
pub mod collider;
pub mod curve;
pub mod particle;
pub mod settings;
pub mod types;

pub use builder::{BoneChain, ChainBuilder};
pub use chain::{ChainId, ColliderRange, ParticleChain};
pub use collider::{BoneCollider, ColliderConfig, PreparedShape};
pub use curve::{Keyframe, ResponseCurve};
pub use particle::Particle;
pub use settings::{ChainSettings, CurvedParameter, DistanceCulling};
pub use types::{Axis, BoundMode, FreezeAxis, Transform};
