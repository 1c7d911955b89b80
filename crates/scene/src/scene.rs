use std::collections::BTreeMap;

use arvis_common::NodeId;
use glam::Mat4;
use serde::Serialize;

use crate::node::SceneNode;

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SceneEvent {
    /// A subtree was attached at the scene root.
    Attached { id: NodeId, name: String },
    /// A root subtree was detached.
    Detached { id: NodeId, name: String },
    /// An attached subtree was replaced by a newer version of itself.
    Updated { id: NodeId },
}

/// Caller-owned container for root subtrees produced by the renderers.
///
/// The scene decides what is on screen; the renderers only build and mutate
/// their own subtrees. Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    roots: BTreeMap<NodeId, SceneNode>,
    /// Mutations not yet drained by the owner.
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of root subtrees.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Number of nodes across every subtree.
    pub fn node_count(&self) -> usize {
        self.roots.values().map(SceneNode::subtree_len).sum()
    }

    /// Read-only access to all root subtrees.
    pub fn roots(&self) -> &BTreeMap<NodeId, SceneNode> {
        &self.roots
    }

    /// Events logged since the last [`drain_events`](Self::drain_events).
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Attach a subtree at the scene root. Returns its id.
    ///
    /// Attaching a subtree whose id is already present replaces it.
    pub fn attach(&mut self, node: SceneNode) -> NodeId {
        let id = node.id();
        tracing::debug!(?id, name = %node.name, "attaching node");
        self.event_log.push(SceneEvent::Attached {
            id,
            name: node.name.clone(),
        });
        self.roots.insert(id, node);
        id
    }

    /// Remove a root subtree. Returns it if it existed.
    pub fn detach(&mut self, id: NodeId) -> Option<SceneNode> {
        let node = self.roots.remove(&id)?;
        tracing::debug!(?id, name = %node.name, "detaching node");
        self.event_log.push(SceneEvent::Detached {
            id,
            name: node.name.clone(),
        });
        Some(node)
    }

    /// Overwrite an attached root subtree with a newer copy carrying the same
    /// id. Returns false if no such root is attached.
    pub fn sync(&mut self, node: &SceneNode) -> bool {
        match self.roots.get_mut(&node.id()) {
            Some(slot) => {
                if slot != node {
                    *slot = node.clone();
                    self.event_log.push(SceneEvent::Updated { id: node.id() });
                }
                true
            }
            None => false,
        }
    }

    /// Find any node in the scene by id.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.roots.values().find_map(|root| root.find(id))
    }

    /// Deterministic hash of the visible scene state, in canonical order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for root in self.roots.values() {
            root.visit(Mat4::IDENTITY, &mut |node, world, depth| {
                mix(&mut h, node.id().0.as_bytes());
                mix(&mut h, &(depth as u64).to_le_bytes());
                for v in world.to_cols_array() {
                    mix(&mut h, &v.to_le_bytes());
                }
                if let Some(quad) = node.quad() {
                    mix(&mut h, &quad.size.width.to_le_bytes());
                    mix(&mut h, &quad.size.height.to_le_bytes());
                    mix(&mut h, &quad.material.texture_repeat.x.to_le_bytes());
                    mix(&mut h, &quad.material.texture_repeat.y.to_le_bytes());
                }
            });
        }
        h
    }
}
