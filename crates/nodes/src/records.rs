use arvis_common::{AnchorId, Size2};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A horizontal plane as reported by the tracker on each detection cycle.
///
/// The tracker keeps `anchor` stable while it refines `center` and `extent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneRecord {
    pub anchor: AnchorId,
    /// Plane center on the ground: `.x` is world X, `.y` is world Z.
    pub center: Vec2,
    /// Plane size: `.x` along world X (width), `.y` along world Z (depth).
    pub extent: Vec2,
}

impl PlaneRecord {
    pub fn new(anchor: AnchorId, center: Vec2, extent: Vec2) -> Self {
        Self {
            anchor,
            center,
            extent,
        }
    }

    pub fn width(&self) -> f32 {
        self.extent.x
    }

    pub fn depth(&self) -> f32 {
        self.extent.y
    }

    /// Where the plane's node sits in the world. Y is always zero.
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.center.x, 0.0, self.center.y)
    }
}

/// A rectangle fitted by the tracker, consumed once to build a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleRecord {
    /// Rectangle center in world space.
    pub position: Vec3,
    /// Size within the rectangle's own plane.
    pub size: Size2,
    /// Radians about the vertical axis, applied on top of the base tilt.
    pub orientation: f32,
}

impl RectangleRecord {
    pub fn new(position: Vec3, size: Size2, orientation: f32) -> Self {
        Self {
            position,
            size,
            orientation,
        }
    }
}
