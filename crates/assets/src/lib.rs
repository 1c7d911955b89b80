//! Texture registry: content-addressed handles, lookup by name.
//!
//! Textures are registered once and shared read-only by every node that
//! references them. Nodes hold an [`AssetId`], never image data or paths.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the grid pattern drawn on detected surfaces.
pub const GRID_TEXTURE: &str = "grid";

/// Content-addressed asset ID computed from the asset description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// A texture the hosting render system knows how to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub name: String,
    /// Where the host should load pixels from, if not built in.
    pub source: Option<String>,
    pub width_px: u32,
    pub height_px: u32,
}

impl Texture {
    /// The built-in grid pattern: one image spans a 16x16 inch patch.
    pub fn grid() -> Self {
        Self {
            name: GRID_TEXTURE.into(),
            source: None,
            width_px: 512,
            height_px: 512,
        }
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no texture named {0:?}")]
    UnknownName(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Content-addressed texture registry.
///
/// Registering the same texture twice yields the same id. The registry can be
/// persisted to disk as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetStore {
    textures: BTreeMap<AssetId, Texture>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the grid texture already registered.
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        store.register_texture(Texture::grid());
        store
    }

    /// Register a texture and return its asset ID.
    pub fn register_texture(&mut self, texture: Texture) -> AssetId {
        let id = content_hash(&texture);
        tracing::debug!(?id, name = %texture.name, "registering texture");
        self.textures.insert(id, texture);
        id
    }

    pub fn get(&self, id: AssetId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    /// Look up a texture by name. When several share a name, the one with the
    /// lowest id wins so the answer is stable.
    pub fn find_by_name(&self, name: &str) -> Result<AssetId, AssetError> {
        self.textures
            .iter()
            .find(|(_, t)| t.name == name)
            .map(|(id, _)| *id)
            .ok_or_else(|| AssetError::UnknownName(name.to_string()))
    }

    /// Number of registered textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Save the registry to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a registry from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let store: Self = serde_json::from_reader(file)?;
        Ok(store)
    }
}

fn content_hash(texture: &Texture) -> AssetId {
    let mut hasher = Sha256::new();
    hasher.update(texture.name.as_bytes());
    hasher.update(texture.source.as_deref().unwrap_or("").as_bytes());
    hasher.update(texture.width_px.to_le_bytes());
    hasher.update(texture.height_px.to_le_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_texture() {
        let mut store = AssetStore::new();
        let id = store.register_texture(Texture::grid());
        assert_eq!(store.get(id).unwrap().name, GRID_TEXTURE);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn content_addressed_dedup() {
        let mut store = AssetStore::new();
        let id1 = store.register_texture(Texture::grid());
        let id2 = store.register_texture(Texture::grid());
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn find_by_name() {
        let store = AssetStore::with_defaults();
        let id = store.find_by_name(GRID_TEXTURE).unwrap();
        assert_eq!(store.get(id).unwrap().name, GRID_TEXTURE);
        assert!(matches!(
            store.find_by_name("checker"),
            Err(AssetError::UnknownName(name)) if name == "checker"
        ));
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut store = AssetStore::with_defaults();
        store.register_texture(Texture {
            name: "checker".into(),
            source: Some("textures/checker.png".into()),
            width_px: 64,
            height_px: 64,
        });
        store.save(tmp.path()).unwrap();

        let loaded = AssetStore::load(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.find_by_name("checker").unwrap(),
            store.find_by_name("checker").unwrap()
        );
    }
}
