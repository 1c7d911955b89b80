use std::collections::BTreeMap;
use std::f32::consts::TAU;

use arvis_common::{NodeId, Size2, Transform, base_tilt};
use arvis_scene::{Geometry, Material, Quad, SceneNode};
use glam::{Quat, Vec3};
use tracing::debug;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::records::RectangleRecord;

/// A fitted rectangle drawn as a flat quad. Immutable once built.
#[derive(Debug, Clone)]
pub struct RectangleNode {
    root: SceneNode,
    size: Size2,
    orientation: f32,
}

impl RectangleNode {
    pub fn new(record: &RectangleRecord, config: &NodeConfig) -> Result<Self, NodeError> {
        let width = config.check_dimension("size.width", record.size.width)?;
        let height = config.check_dimension("size.height", record.size.height)?;
        let position = Vec3::new(
            config.check_finite("position.x", record.position.x)?,
            config.check_finite("position.y", record.position.y)?,
            config.check_finite("position.z", record.position.z)?,
        );
        let orientation = wrap_angle(config.check_finite("orientation", record.orientation)?);
        let size = Size2::new(width, height);

        let quad = SceneNode::new("rectangle-plane")
            .with_geometry(Geometry::Quad(
                Quad::new(size).with_material(Material {
                    name: "rectangle".into(),
                    ..Material::default()
                }),
            ))
            .with_transform(Transform::from_rotation(local_rotation(orientation)));

        let mut root = SceneNode::new("rectangle").with_transform(Transform::from_position(position));
        root.add_child(quad);

        debug!(
            id = ?root.id(),
            width,
            height,
            orientation,
            "rectangle created"
        );
        Ok(Self {
            root,
            size,
            orientation,
        })
    }

    pub fn id(&self) -> NodeId {
        self.root.id()
    }

    pub fn size(&self) -> Size2 {
        self.size
    }

    pub fn position(&self) -> Vec3 {
        self.root.transform.position
    }

    /// Orientation in radians, normalized into `[0, 2π)`.
    pub fn orientation(&self) -> f32 {
        self.orientation
    }

    /// Rotation of the quad relative to the root.
    pub fn local_rotation(&self) -> Quat {
        self.plane_node().transform.rotation
    }

    pub fn node(&self) -> &SceneNode {
        &self.root
    }

    pub fn plane_node(&self) -> &SceneNode {
        &self.root.children()[0]
    }

    pub fn into_node(self) -> SceneNode {
        self.root
    }
}

/// Normalize into `[0, 2π)`. `rem_euclid` rounds tiny negative angles up to
/// exactly `TAU`, which is folded back to zero.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Base tilt with the orientation right-multiplied, i.e. a turn about the
/// quad's own Y axis. Swapping the order turns about world Y instead.
fn local_rotation(orientation: f32) -> Quat {
    base_tilt() * Quat::from_rotation_y(orientation)
}

/// Opaque handle to a rectangle owned by a [`RectangleRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RectangleHandle(NodeId);

/// Owns the rectangles currently shown. Rectangles are never mutated; a new
/// detection replaces the old node with a new one under a new handle.
#[derive(Debug, Default)]
pub struct RectangleRenderer {
    config: NodeConfig,
    rectangles: BTreeMap<RectangleHandle, RectangleNode>,
}

impl RectangleRenderer {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            rectangles: BTreeMap::new(),
        }
    }

    pub fn construct(&mut self, record: &RectangleRecord) -> Result<RectangleHandle, NodeError> {
        let node = RectangleNode::new(record, &self.config)?;
        let handle = RectangleHandle(node.id());
        self.rectangles.insert(handle, node);
        Ok(handle)
    }

    /// Build a node for `record` and drop the one behind `handle`. Returns the
    /// new handle and the retired node.
    ///
    /// Nothing changes if the record is rejected or the handle is unknown.
    pub fn replace(
        &mut self,
        handle: RectangleHandle,
        record: &RectangleRecord,
    ) -> Result<(RectangleHandle, RectangleNode), NodeError> {
        if !self.rectangles.contains_key(&handle) {
            return Err(NodeError::UnknownRectangle(handle));
        }
        let new_handle = self.construct(record)?;
        let old = self
            .rectangles
            .remove(&handle)
            .ok_or(NodeError::UnknownRectangle(handle))?;
        Ok((new_handle, old))
    }

    pub fn remove(&mut self, handle: RectangleHandle) -> Option<RectangleNode> {
        self.rectangles.remove(&handle)
    }

    pub fn get(&self, handle: RectangleHandle) -> Option<&RectangleNode> {
        self.rectangles.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.rectangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }
}
