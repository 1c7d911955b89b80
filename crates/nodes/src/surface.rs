use std::collections::BTreeMap;

use arvis_assets::AssetStore;
use arvis_common::{AnchorId, NodeId, Size2, Transform, base_tilt};
use arvis_scene::{Geometry, Material, Quad, SceneNode, TextureHandle};
use glam::{Vec2, Vec3};
use tracing::{debug, trace};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::records::PlaneRecord;

/// Index of the quad child under a surface's root node.
const PLANE_CHILD: usize = 0;

/// A tracked plane drawn as a grid-textured quad.
///
/// The root node carries the plane's position on the ground; its single child
/// carries the quad and the base tilt. Plane centers drift as the tracker
/// refines them, and that drift only ever moves the root.
#[derive(Debug, Clone)]
pub struct SurfaceNode {
    anchor: AnchorId,
    root: SceneNode,
    size: Size2,
    material: Material,
    config: NodeConfig,
}

impl SurfaceNode {
    /// Build the node for a newly detected plane.
    pub fn new(
        plane: &PlaneRecord,
        config: &NodeConfig,
        texture: TextureHandle,
    ) -> Result<Self, NodeError> {
        let (size, position) = checked_geometry(config, plane)?;
        let repeat = grid_repeat(config, size);

        let mut root = SceneNode::new("surface");
        root.add_child(
            SceneNode::new("surface-plane").with_transform(Transform::from_rotation(base_tilt())),
        );

        let mut node = Self {
            anchor: plane.anchor,
            root,
            size,
            material: Material::tiled(config.grid_texture.clone(), texture, repeat),
            config: config.clone(),
        };
        node.apply(position);
        debug!(
            id = ?node.id(),
            anchor = ?plane.anchor,
            width = size.width,
            depth = size.height,
            "surface created"
        );
        Ok(node)
    }

    /// Follow the tracker's latest estimate for the same plane.
    ///
    /// Resizes the quad and moves the root. The grid repeat is left as built
    /// unless `retile_on_update` is set.
    pub fn update(&mut self, plane: &PlaneRecord) -> Result<(), NodeError> {
        if plane.anchor != self.anchor {
            return Err(NodeError::AnchorMismatch {
                expected: self.anchor,
                actual: plane.anchor,
            });
        }
        let (size, position) = checked_geometry(&self.config, plane)?;
        self.size = size;
        if self.config.retile_on_update {
            self.material.texture_repeat = grid_repeat(&self.config, size);
        }
        self.apply(position);
        trace!(
            id = ?self.id(),
            width = size.width,
            depth = size.height,
            x = position.x,
            z = position.z,
            "surface updated"
        );
        Ok(())
    }

    /// Id of the root node. Stable across updates.
    pub fn id(&self) -> NodeId {
        self.root.id()
    }

    /// The tracked plane this node follows.
    pub fn anchor(&self) -> AnchorId {
        self.anchor
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn size(&self) -> Size2 {
        self.size
    }

    pub fn position(&self) -> Vec3 {
        self.root.transform.position
    }

    /// How many grid tiles span the quad on each axis.
    pub fn texture_repeat(&self) -> Vec2 {
        self.material.texture_repeat
    }

    /// The renderable subtree.
    pub fn node(&self) -> &SceneNode {
        &self.root
    }

    /// The child carrying the quad geometry.
    pub fn plane_node(&self) -> &SceneNode {
        &self.root.children()[PLANE_CHILD]
    }

    pub fn into_node(self) -> SceneNode {
        self.root
    }

    fn apply(&mut self, position: Vec3) {
        self.root.transform.position = position;
        let quad = Quad::new(self.size).with_material(self.material.clone());
        self.root.children_mut()[PLANE_CHILD].geometry = Some(Geometry::Quad(quad));
    }
}

fn checked_geometry(config: &NodeConfig, plane: &PlaneRecord) -> Result<(Size2, Vec3), NodeError> {
    let checked = PlaneRecord::new(
        plane.anchor,
        Vec2::new(
            config.check_finite("center.x", plane.center.x)?,
            config.check_finite("center.z", plane.center.y)?,
        ),
        Vec2::new(
            config.check_dimension("extent.x", plane.width())?,
            config.check_dimension("extent.z", plane.depth())?,
        ),
    );
    Ok((
        Size2::new(checked.width(), checked.depth()),
        checked.world_position(),
    ))
}

fn grid_repeat(config: &NodeConfig, size: Size2) -> Vec2 {
    let k = config.tiles_per_meter();
    Vec2::new(k * size.width, k * size.height)
}

/// Opaque handle to a surface owned by a [`SurfaceRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(NodeId);

/// Owns the surfaces built for a tracking session.
///
/// Callers correlate tracker updates to surfaces through the handle returned
/// by [`construct`](Self::construct); the renderer never guesses which surface
/// a record belongs to.
#[derive(Debug)]
pub struct SurfaceRenderer {
    config: NodeConfig,
    texture: TextureHandle,
    surfaces: BTreeMap<SurfaceHandle, SurfaceNode>,
}

impl SurfaceRenderer {
    /// Resolve the grid texture once; every surface shares it.
    pub fn new(config: NodeConfig, assets: &AssetStore) -> Result<Self, NodeError> {
        let id = assets
            .find_by_name(&config.grid_texture)
            .map_err(|_| NodeError::MissingTexture(config.grid_texture.clone()))?;
        Ok(Self {
            config,
            texture: TextureHandle(id.0),
            surfaces: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn construct(&mut self, plane: &PlaneRecord) -> Result<SurfaceHandle, NodeError> {
        let node = SurfaceNode::new(plane, &self.config, self.texture)?;
        let handle = SurfaceHandle(node.id());
        self.surfaces.insert(handle, node);
        Ok(handle)
    }

    pub fn update(&mut self, handle: SurfaceHandle, plane: &PlaneRecord) -> Result<(), NodeError> {
        self.surfaces
            .get_mut(&handle)
            .ok_or(NodeError::UnknownSurface(handle))?
            .update(plane)
    }

    /// Drop a surface whose plane is no longer tracked.
    pub fn remove(&mut self, handle: SurfaceHandle) -> Option<SurfaceNode> {
        let node = self.surfaces.remove(&handle)?;
        debug!(id = ?node.id(), anchor = ?node.anchor(), "surface removed");
        Some(node)
    }

    pub fn get(&self, handle: SurfaceHandle) -> Option<&SurfaceNode> {
        self.surfaces.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DimensionPolicy;

    fn plane(anchor: AnchorId, cx: f32, cz: f32, w: f32, d: f32) -> PlaneRecord {
        PlaneRecord::new(anchor, Vec2::new(cx, cz), Vec2::new(w, d))
    }

    fn build(p: &PlaneRecord) -> SurfaceNode {
        SurfaceNode::new(p, &NodeConfig::default(), TextureHandle(1)).unwrap()
    }

    #[test]
    fn construct_matches_plane() {
        let node = build(&plane(AnchorId::new(), 1.0, 2.0, 3.0, 4.0));
        assert_eq!(node.size(), Size2::new(3.0, 4.0));
        assert_eq!(node.position(), Vec3::new(1.0, 0.0, 2.0));

        let quad = node.plane_node().quad().unwrap();
        assert_eq!(quad.size, Size2::new(3.0, 4.0));
        assert_eq!(quad.material.texture, Some(TextureHandle(1)));
        assert_eq!(node.plane_node().transform.rotation, base_tilt());
        // Center lives on the root only.
        assert_eq!(node.plane_node().transform.position, Vec3::ZERO);
    }

    #[test]
    fn construct_holds_for_many_extents() {
        for (w, d) in [(0.1, 0.1), (1.0, 7.5), (12.0, 0.3), (250.0, 99.0)] {
            let node = build(&plane(AnchorId::new(), -4.0, 9.0, w, d));
            assert_eq!(node.width(), w);
            assert_eq!(node.height(), d);
            assert_eq!(node.position(), Vec3::new(-4.0, 0.0, 9.0));
        }
    }

    #[test]
    fn repeat_scales_linearly_with_extent() {
        let small = build(&plane(AnchorId::new(), 0.0, 0.0, 1.5, 0.75));
        let large = build(&plane(AnchorId::new(), 0.0, 0.0, 3.0, 1.5));
        assert!(large.texture_repeat().abs_diff_eq(small.texture_repeat() * 2.0, 1e-5));

        let k = NodeConfig::default().tiles_per_meter();
        assert!(small.texture_repeat().abs_diff_eq(Vec2::new(1.5 * k, 0.75 * k), 1e-5));
    }

    #[test]
    fn update_moves_and_resizes_in_place() {
        let anchor = AnchorId::new();
        let mut node = build(&plane(anchor, 0.0, 0.0, 1.0, 1.0));
        let id = node.id();
        let plane_id = node.plane_node().id();
        let repeat = node.texture_repeat();

        node.update(&plane(anchor, 0.5, -0.25, 2.0, 3.0)).unwrap();
        assert_eq!(node.id(), id);
        assert_eq!(node.plane_node().id(), plane_id);
        assert_eq!(node.size(), Size2::new(2.0, 3.0));
        assert_eq!(node.plane_node().quad().unwrap().size, Size2::new(2.0, 3.0));
        assert_eq!(node.position(), Vec3::new(0.5, 0.0, -0.25));
        assert_eq!(node.plane_node().transform.position, Vec3::ZERO);
        // Repeat is fixed at construction by default.
        assert_eq!(node.texture_repeat(), repeat);
    }

    #[test]
    fn update_is_idempotent() {
        let anchor = AnchorId::new();
        let mut node = build(&plane(anchor, 0.0, 0.0, 1.0, 1.0));
        let p = plane(anchor, 3.0, 1.0, 2.0, 2.5);

        node.update(&p).unwrap();
        let once = node.node().clone();
        node.update(&p).unwrap();
        assert_eq!(node.node(), &once);
    }

    #[test]
    fn retile_on_update_recomputes_repeat() {
        let config = NodeConfig {
            retile_on_update: true,
            ..NodeConfig::default()
        };
        let anchor = AnchorId::new();
        let mut node = SurfaceNode::new(&plane(anchor, 0.0, 0.0, 1.0, 1.0), &config, TextureHandle(1))
            .unwrap();
        let before = node.texture_repeat();
        node.update(&plane(anchor, 0.0, 0.0, 2.0, 2.0)).unwrap();
        assert!(node.texture_repeat().abs_diff_eq(before * 2.0, 1e-5));
    }

    #[test]
    fn update_rejects_other_anchor() {
        let mut node = build(&plane(AnchorId::new(), 0.0, 0.0, 1.0, 1.0));
        let err = node
            .update(&plane(AnchorId::new(), 0.0, 0.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, NodeError::AnchorMismatch { .. }));
    }

    #[test]
    fn zero_extent_is_a_zero_area_quad() {
        let node = build(&plane(AnchorId::new(), 0.0, 0.0, 0.0, 0.0));
        assert_eq!(node.size().area(), 0.0);
        assert_eq!(node.texture_repeat(), Vec2::ZERO);
    }

    #[test]
    fn malformed_extent_follows_policy() {
        let bad = plane(AnchorId::new(), 0.0, f32::NAN, -1.0, 2.0);
        let err = SurfaceNode::new(&bad, &NodeConfig::default(), TextureHandle(1)).unwrap_err();
        assert!(matches!(
            err,
            NodeError::ConstraintViolation { what: "extent.x", .. }
        ));

        let clamp = NodeConfig {
            dimension_policy: DimensionPolicy::Clamp,
            ..NodeConfig::default()
        };
        let node = SurfaceNode::new(&bad, &clamp, TextureHandle(1)).unwrap();
        assert_eq!(node.size(), Size2::new(0.0, 2.0));
        assert_eq!(node.position(), Vec3::ZERO);
    }

    #[test]
    fn renderer_correlates_by_handle() {
        let mut renderer =
            SurfaceRenderer::new(NodeConfig::default(), &AssetStore::with_defaults()).unwrap();
        let a = AnchorId::new();
        let b = AnchorId::new();
        let ha = renderer.construct(&plane(a, 0.0, 0.0, 1.0, 1.0)).unwrap();
        let hb = renderer.construct(&plane(b, 5.0, 5.0, 1.0, 1.0)).unwrap();
        assert_eq!(renderer.len(), 2);

        renderer.update(ha, &plane(a, 1.0, 1.0, 2.0, 2.0)).unwrap();
        assert_eq!(renderer.get(ha).unwrap().position(), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(renderer.get(hb).unwrap().position(), Vec3::new(5.0, 0.0, 5.0));

        assert!(matches!(
            renderer.update(hb, &plane(a, 0.0, 0.0, 1.0, 1.0)),
            Err(NodeError::AnchorMismatch { .. })
        ));

        let removed = renderer.remove(ha).unwrap();
        assert_eq!(removed.anchor(), a);
        assert!(matches!(
            renderer.update(ha, &plane(a, 0.0, 0.0, 1.0, 1.0)),
            Err(NodeError::UnknownSurface(h)) if h == ha
        ));
    }

    #[test]
    fn renderer_requires_grid_texture() {
        let err = SurfaceRenderer::new(NodeConfig::default(), &AssetStore::new()).unwrap_err();
        assert!(matches!(err, NodeError::MissingTexture(name) if name == "grid"));
    }
}
