//! Shared types for scenepack.
//!
//! The in-memory scene graph, the composition shape consumed by the direct
//! compiler, transform math, and the binary format constants every other
//! crate in the workspace agrees on.

pub mod composition;
pub mod format;
pub mod math;
pub mod scene;

pub use composition::*;
pub use format::*;
pub use math::*;
pub use scene::*;
