use std::fmt::Write;

use arvis_scene::{Scene, WrapMode};
use glam::{Mat4, Vec3};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        // Roughly a handheld device held at chest height.
        Self {
            eye: Vec3::new(0.0, 1.5, 1.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of the scene tree.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let _span = tracing::trace_span!("debug_text_render").entered();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (roots={}, nodes={}) ===",
            scene.root_count(),
            scene.node_count()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        for root in scene.roots().values() {
            root.visit(Mat4::IDENTITY, &mut |node, world, depth| {
                let p = world.w_axis.truncate();
                let indent = "  ".repeat(depth + 1);
                let _ = write!(
                    out,
                    "{indent}[{:.8}] {} pos=({:.2}, {:.2}, {:.2})",
                    &node.id().0.to_string()[..8],
                    node.name,
                    p.x,
                    p.y,
                    p.z
                );
                if let Some(quad) = node.quad() {
                    let _ = write!(
                        out,
                        " quad={:.2}x{:.2}",
                        quad.size.width, quad.size.height
                    );
                    let m = &quad.material;
                    if m.texture.is_some() {
                        let wrap = match (m.wrap_s, m.wrap_t) {
                            (WrapMode::Repeat, WrapMode::Repeat) => "repeat",
                            _ => "clamp",
                        };
                        let _ = write!(
                            out,
                            " texture={} {wrap}=({:.2}, {:.2})",
                            m.name, m.texture_repeat.x, m.texture_repeat.y
                        );
                    }
                }
                out.push('\n');
            });
        }

        out
    }
}
