use std::collections::BTreeMap;

use arvis_assets::AssetStore;
use arvis_common::AnchorId;
use arvis_scene::{Scene, SceneEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::rectangle::{RectangleHandle, RectangleNode, RectangleRenderer};
use crate::records::{PlaneRecord, RectangleRecord};
use crate::surface::{SurfaceHandle, SurfaceNode, SurfaceRenderer};

/// Lifecycle events emitted by the external tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackingEvent {
    /// A plane was detected for the first time.
    PlaneAdded { plane: PlaneRecord },
    /// The tracker refined an existing plane.
    PlaneUpdated { plane: PlaneRecord },
    /// The tracker stopped tracking a plane.
    PlaneRemoved { anchor: AnchorId },
    /// A rectangle was fitted. Replaces whatever rectangle was shown before.
    RectangleDetected { rectangle: RectangleRecord },
}

/// Glue between the tracker's event stream and a caller-visible [`Scene`].
///
/// Keeps the anchor-to-surface correlation, so the tracker only has to speak
/// in anchors, and mirrors every node change into the scene. The scene is
/// read-only to callers; only tracker events change it.
#[derive(Debug)]
pub struct AnchorSession {
    surfaces: SurfaceRenderer,
    rectangles: RectangleRenderer,
    by_anchor: BTreeMap<AnchorId, SurfaceHandle>,
    rectangle: Option<RectangleHandle>,
    scene: Scene,
}

impl AnchorSession {
    pub fn new(config: NodeConfig, assets: &AssetStore) -> Result<Self, NodeError> {
        Ok(Self {
            surfaces: SurfaceRenderer::new(config.clone(), assets)?,
            rectangles: RectangleRenderer::new(config),
            by_anchor: BTreeMap::new(),
            rectangle: None,
            scene: Scene::new(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of planes currently tracked.
    pub fn surface_count(&self) -> usize {
        self.by_anchor.len()
    }

    pub fn surface(&self, anchor: AnchorId) -> Option<&SurfaceNode> {
        let handle = self.by_anchor.get(&anchor)?;
        self.surfaces.get(*handle)
    }

    pub fn rectangle(&self) -> Option<&RectangleNode> {
        self.rectangles.get(self.rectangle?)
    }

    /// Apply one tracker event and return the scene changes it caused.
    ///
    /// On error the session and scene are unchanged.
    pub fn apply(&mut self, event: &TrackingEvent) -> Result<Vec<SceneEvent>, NodeError> {
        let _span = info_span!("apply_tracking_event").entered();
        match event {
            TrackingEvent::PlaneAdded { plane } => {
                if self.by_anchor.contains_key(&plane.anchor) {
                    return Err(NodeError::DuplicateAnchor(plane.anchor));
                }
                let handle = self.surfaces.construct(plane)?;
                self.by_anchor.insert(plane.anchor, handle);
                if let Some(node) = self.surfaces.get(handle) {
                    self.scene.attach(node.node().clone());
                }
            }
            TrackingEvent::PlaneUpdated { plane } => {
                let handle = *self
                    .by_anchor
                    .get(&plane.anchor)
                    .ok_or(NodeError::UnknownAnchor(plane.anchor))?;
                self.surfaces.update(handle, plane)?;
                if let Some(node) = self.surfaces.get(handle) {
                    self.scene.sync(node.node());
                }
            }
            TrackingEvent::PlaneRemoved { anchor } => {
                let handle = self
                    .by_anchor
                    .remove(anchor)
                    .ok_or(NodeError::UnknownAnchor(*anchor))?;
                if let Some(node) = self.surfaces.remove(handle) {
                    self.scene.detach(node.id());
                }
            }
            TrackingEvent::RectangleDetected { rectangle } => {
                let handle = match self.rectangle {
                    Some(current) => {
                        let (handle, old) = self.rectangles.replace(current, rectangle)?;
                        self.scene.detach(old.id());
                        handle
                    }
                    None => self.rectangles.construct(rectangle)?,
                };
                self.rectangle = Some(handle);
                if let Some(node) = self.rectangles.get(handle) {
                    self.scene.attach(node.node().clone());
                }
            }
        }
        debug!(
            surfaces = self.by_anchor.len(),
            nodes = self.scene.node_count(),
            "tracking event applied"
        );
        Ok(self.scene.drain_events())
    }

    /// Apply events in order, stopping at the first failure. Returns every
    /// scene change in order.
    pub fn apply_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a TrackingEvent>,
    ) -> Result<Vec<SceneEvent>, NodeError> {
        let mut changes = Vec::new();
        for event in events {
            changes.extend(self.apply(event)?);
        }
        Ok(changes)
    }
}
