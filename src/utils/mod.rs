//! Utility helpers: math extensions, logging, and frame profiling.

pub mod logging;
pub mod math;
pub mod profiling;

pub use math::*;
pub use profiling::FrameProfile;
