//! Rendering adapter: renderer-agnostic interface over a [`Scene`](arvis_scene::Scene).
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Output derives only from the scene and the view.
//!
//! The hosting application supplies the real GPU renderer. This crate ships a
//! text renderer for the CLI, logs and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "arvis-render v0.1.0"
}
