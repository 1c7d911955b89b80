//! Visualization nodes for AR tracking output.
//!
//! Two independent builders turn records produced by an external tracker into
//! scene subtrees:
//! - [`SurfaceNode`] draws a detected horizontal plane as a grid-textured quad
//!   and follows the plane as the tracker refines it.
//! - [`RectangleNode`] draws a fitted rectangle as a flat quad. It is built
//!   once and never mutated; re-detection builds a new node.
//!
//! # Invariants
//! - A surface's quad is always `extent.x` by `extent.z`, and its root sits at
//!   `(center.x, 0, center.z)`. The center is carried by the root transform,
//!   never baked into the quad.
//! - Node ids never change across updates.
//! - Nodes are only built through their constructors; there is no decode path.

mod config;
mod error;
mod rectangle;
mod records;
mod session;
mod surface;

pub use config::{DimensionPolicy, NodeConfig};
pub use error::{ConfigError, NodeError};
pub use rectangle::{RectangleHandle, RectangleNode, RectangleRenderer};
pub use records::{PlaneRecord, RectangleRecord};
pub use session::{AnchorSession, TrackingEvent};
pub use surface::{SurfaceHandle, SurfaceNode, SurfaceRenderer};

pub fn crate_info() -> &'static str {
    "arvis-nodes v0.1.0"
}
