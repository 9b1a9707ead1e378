//! Error types for chain construction.
//!
//! Only building a chain can fail. Everything that runs per frame degrades to a no-op
//! instead of surfacing an error.

use std::fmt;

use crate::rig::BoneId;

/// Errors reported while turning [`ChainSettings`](crate::ChainSettings) into a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum JiggleError {
    /// A bone referenced by the settings does not exist in the hierarchy.
    UnknownBone(BoneId),
    /// A root produced more particles than one chain slot can hold.
    ChainCapacityExceeded {
        root: BoneId,
        particles: usize,
        capacity: usize,
    },
    /// More colliders were configured than one collider group can hold.
    ColliderCapacityExceeded { colliders: usize, capacity: usize },
    /// A scalar or vector parameter is NaN or infinite.
    InvalidParameter { name: &'static str, value: f32 },
}

impl fmt::Display for JiggleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownBone(bone) => write!(f, "unknown bone {}", bone.index()),
            Self::ChainCapacityExceeded {
                root,
                particles,
                capacity,
            } => write!(
                f,
                "chain rooted at bone {} needs {particles} particles, capacity is {capacity}",
                root.index()
            ),
            Self::ColliderCapacityExceeded {
                colliders,
                capacity,
            } => write!(f, "{colliders} colliders configured, capacity is {capacity}"),
            Self::InvalidParameter { name, value } => {
                write!(f, "parameter `{name}` must be finite, got {value}")
            }
        }
    }
}

impl std::error::Error for JiggleError {}

/// Convenience result alias used by the builder.
pub type Result<T> = std::result::Result<T, JiggleError>;
