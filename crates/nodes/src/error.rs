use arvis_common::AnchorId;

use crate::rectangle::RectangleHandle;
use crate::surface::SurfaceHandle;

/// Errors from building or updating visualization nodes.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("{what} must be finite and non-negative, got {value}")]
    ConstraintViolation { what: &'static str, value: f32 },
    #[error("no surface for handle {0:?}")]
    UnknownSurface(SurfaceHandle),
    #[error("no rectangle for handle {0:?}")]
    UnknownRectangle(RectangleHandle),
    #[error("surface tracks anchor {expected:?}, record is for {actual:?}")]
    AnchorMismatch { expected: AnchorId, actual: AnchorId },
    #[error("anchor {0:?} is not tracked")]
    UnknownAnchor(AnchorId),
    #[error("anchor {0:?} is already tracked")]
    DuplicateAnchor(AnchorId),
    #[error("texture {0:?} is not registered")]
    MissingTexture(String),
}

/// Errors from loading a [`NodeConfig`](crate::NodeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
