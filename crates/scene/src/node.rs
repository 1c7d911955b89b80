use arvis_common::{NodeId, Size2, Transform};
use glam::{Mat4, Vec2};
use serde::Serialize;

/// A handle referencing a texture asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextureHandle(pub u64);

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WrapMode {
    #[default]
    Clamp,
    Repeat,
}

/// Surface appearance of a piece of geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub texture: Option<TextureHandle>,
    /// Wrap mode along the texture's U axis.
    pub wrap_s: WrapMode,
    /// Wrap mode along the texture's V axis.
    pub wrap_t: WrapMode,
    /// Number of texture tiles across the surface on each axis.
    pub texture_repeat: Vec2,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".into(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            texture: None,
            wrap_s: WrapMode::Clamp,
            wrap_t: WrapMode::Clamp,
            texture_repeat: Vec2::ONE,
        }
    }
}

impl Material {
    /// A material that tiles `texture` `repeat` times on each axis.
    pub fn tiled(name: impl Into<String>, texture: TextureHandle, repeat: Vec2) -> Self {
        Self {
            name: name.into(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            texture: Some(texture),
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            texture_repeat: repeat,
        }
    }
}

/// Flat rectangle centered on its local origin, spanning the local XY plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quad {
    pub size: Size2,
    pub material: Material,
}

impl Quad {
    pub fn new(size: Size2) -> Self {
        Self {
            size,
            material: Material::default(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }
}

/// Renderable geometry carried by a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Geometry {
    Quad(Quad),
}

/// A render node: optional geometry, a local transform, and owned children.
///
/// Nodes are plain values. Grouping is done by composition: a parent owns
/// its children and child transforms are relative to the parent.
///
/// There is deliberately no `Deserialize` impl; nodes are built by the code
/// that knows what they represent, never decoded generically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub geometry: Option<Geometry>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// An empty grouping node at the parent's origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform: Transform::default(),
            geometry: None,
            children: Vec::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    /// Attach `child` under this node. Returns the child's id.
    pub fn add_child(&mut self, child: SceneNode) -> NodeId {
        let id = child.id;
        self.children.push(child);
        id
    }

    /// Depth-first search of this subtree, including `self`.
    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn quad(&self) -> Option<&Quad> {
        match &self.geometry {
            Some(Geometry::Quad(q)) => Some(q),
            None => None,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    /// Visit every node in the subtree depth-first with its accumulated
    /// world matrix and depth (0 for `self`).
    pub fn visit<F>(&self, parent: Mat4, f: &mut F)
    where
        F: FnMut(&SceneNode, Mat4, usize),
    {
        self.visit_at(parent, 0, f);
    }

    fn visit_at<F>(&self, parent: Mat4, depth: usize, f: &mut F)
    where
        F: FnMut(&SceneNode, Mat4, usize),
    {
        let world = parent * self.transform.to_matrix();
        f(self, world, depth);
        for child in &self.children {
            child.visit_at(world, depth + 1, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn quad_node(w: f32, h: f32) -> SceneNode {
        SceneNode::new("quad").with_geometry(Geometry::Quad(Quad::new(Size2::new(w, h))))
    }

    #[test]
    fn add_child_returns_child_id() {
        let mut root = SceneNode::new("root");
        let id = root.add_child(quad_node(1.0, 2.0));
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].id(), id);
        assert_eq!(root.subtree_len(), 2);
    }

    #[test]
    fn find_searches_nested_children() {
        let mut inner = SceneNode::new("inner");
        let leaf_id = inner.add_child(quad_node(1.0, 1.0));
        let mut root = SceneNode::new("root");
        root.add_child(inner);

        assert_eq!(root.find(leaf_id).unwrap().name, "quad");
        assert_eq!(root.find(leaf_id).unwrap().quad().unwrap().size, Size2::new(1.0, 1.0));
        assert!(root.find(NodeId::new()).is_none());
    }

    #[test]
    fn visit_accumulates_parent_transform() {
        let mut root = SceneNode::new("root")
            .with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 2.0)));
        root.add_child(
            quad_node(1.0, 1.0).with_transform(Transform::from_rotation(Quat::from_rotation_y(0.5))),
        );

        let mut seen = Vec::new();
        root.visit(Mat4::IDENTITY, &mut |node, world, depth| {
            seen.push((node.name.clone(), world.transform_point3(Vec3::ZERO), depth));
        });

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].2, 0);
        assert_eq!(seen[1].2, 1);
        assert!(seen[1].1.abs_diff_eq(Vec3::new(1.0, 0.0, 2.0), 1e-6));
    }

    #[test]
    fn tiled_material_repeats_both_axes() {
        let m = Material::tiled("grid", TextureHandle(7), Vec2::new(2.0, 3.0));
        assert_eq!(m.wrap_s, WrapMode::Repeat);
        assert_eq!(m.wrap_t, WrapMode::Repeat);
        assert_eq!(m.texture, Some(TextureHandle(7)));
        assert_eq!(Material::default().wrap_s, WrapMode::Clamp);
    }
}
