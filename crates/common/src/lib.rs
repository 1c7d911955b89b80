//! Shared types for the arvis crates.
//!
//! Everything here is plain data: ids, transforms and 2D sizes. No crate in
//! the workspace depends on anything more specific than these to talk about
//! where a node sits in the world.

mod types;

pub use types::{AnchorId, NodeId, Size2, Transform, base_tilt};
