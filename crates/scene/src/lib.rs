//! Scene graph: render nodes composed from geometry, material and children.
//!
//! # Invariants
//! - A node owns its children; there is no shared or back-pointing ownership.
//! - Node ids are stable for the lifetime of the node, whatever mutates it.
//! - All mutations of an attached subtree through [`Scene`] are logged.

mod node;
mod scene;

pub use node::{Geometry, Material, Quad, SceneNode, TextureHandle, WrapMode};
pub use scene::{Scene, SceneEvent};
