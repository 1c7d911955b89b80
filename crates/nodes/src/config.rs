use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, NodeError};

/// Real-world span of one grid texture image: 16 inches.
const DEFAULT_TILE_SPAN_METERS: f32 = 0.4064;

/// What to do with negative or non-finite dimensions coming from the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionPolicy {
    /// Fail construction/update with [`NodeError::ConstraintViolation`].
    #[default]
    Reject,
    /// Replace the offending value with zero and log a warning.
    Clamp,
}

/// Node construction settings.
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Real-world size, in meters, covered by one copy of the grid texture.
    pub tile_span_meters: f32,
    /// Registered name of the texture drawn on surfaces.
    pub grid_texture: String,
    pub dimension_policy: DimensionPolicy,
    /// Recompute the grid repeat when a surface is resized. Off by default,
    /// which keeps the repeat chosen at construction.
    pub retile_on_update: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            tile_span_meters: DEFAULT_TILE_SPAN_METERS,
            grid_texture: arvis_assets::GRID_TEXTURE.into(),
            dimension_policy: DimensionPolicy::Reject,
            retile_on_update: false,
        }
    }
}

impl NodeConfig {
    /// Parse and validate a YAML config.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tile_span_meters.is_finite() || self.tile_span_meters <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tile_span_meters must be positive, got {}",
                self.tile_span_meters
            )));
        }
        if self.grid_texture.is_empty() {
            return Err(ConfigError::Invalid("grid_texture must not be empty".into()));
        }
        Ok(())
    }

    /// Grid repeats per meter of surface, about 2.46063 with the default span.
    pub fn tiles_per_meter(&self) -> f32 {
        1.0 / self.tile_span_meters
    }

    /// Apply the dimension policy to a width/height/extent value.
    pub(crate) fn check_dimension(&self, what: &'static str, value: f32) -> Result<f32, NodeError> {
        if value.is_finite() && value >= 0.0 {
            return Ok(value);
        }
        match self.dimension_policy {
            DimensionPolicy::Reject => Err(NodeError::ConstraintViolation { what, value }),
            DimensionPolicy::Clamp => {
                warn!(what, value, "clamping invalid dimension to zero");
                Ok(0.0)
            }
        }
    }

    /// Apply the dimension policy to a coordinate or angle, which may be
    /// negative but must be finite.
    pub(crate) fn check_finite(&self, what: &'static str, value: f32) -> Result<f32, NodeError> {
        if value.is_finite() {
            return Ok(value);
        }
        match self.dimension_policy {
            DimensionPolicy::Reject => Err(NodeError::ConstraintViolation { what, value }),
            DimensionPolicy::Clamp => {
                warn!(what, value, "clamping non-finite value to zero");
                Ok(0.0)
            }
        }
    }
}
