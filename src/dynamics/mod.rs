//! Per-frame simulation: anchoring, pose propagation, integration, constraints, and write-back.

pub mod anchor;
pub mod integrator;
pub mod orientation;
pub mod parallel;
pub mod pipeline;
pub mod pose;
pub mod solver;

pub use integrator::Integrator;
pub use pipeline::FramePipeline;
