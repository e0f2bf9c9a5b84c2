use anyhow::{bail, Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Clip picked when a catalog entry does not name one
pub const DEFAULT_CLIP_NAME: &str = "Take 001";

/// Display scale of a model, either one factor or one per axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetScale {
    Uniform(f32),
    PerAxis([f32; 3]),
}

impl AssetScale {
    pub fn to_vec3(self) -> Vec3 {
        match self {
            AssetScale::Uniform(s) => Vec3::splat(s),
            AssetScale::PerAxis(v) => Vec3::from_array(v),
        }
    }
}

impl Default for AssetScale {
    fn default() -> Self {
        AssetScale::Uniform(1.0)
    }
}

/// One loadable model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub id: String,
    pub source_path: String,
    #[serde(default)]
    pub scale: AssetScale,
    #[serde(default)]
    pub placement: [f32; 3],
    /// Preferred animation clip; the first clip is used when absent or missing
    #[serde(default)]
    pub clip: Option<String>,
}

impl AssetDescriptor {
    pub fn new(id: &str, source_path: &str, scale: AssetScale, placement: [f32; 3]) -> Self {
        Self {
            id: id.to_string(),
            source_path: source_path.to_string(),
            scale,
            placement,
            clip: None,
        }
    }

    pub fn with_clip(mut self, clip: &str) -> Self {
        self.clip = Some(clip.to_string());
        self
    }

    pub fn preferred_clip(&self) -> &str {
        self.clip.as_deref().unwrap_or(DEFAULT_CLIP_NAME)
    }

    pub fn placement(&self) -> Vec3 {
        Vec3::from_array(self.placement)
    }
}

/// Static id -> descriptor table, kept in insertion order for the model picker
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    entries: Vec<AssetDescriptor>,
}

impl AssetCatalog {
    pub fn new(entries: Vec<AssetDescriptor>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.id == entry.id) {
                bail!("Duplicate model id in catalog: {:?}", entry.id);
            }
        }
        Ok(Self { entries })
    }

    /// Models shipped with the viewer
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                AssetDescriptor::new(
                    "Phoenix",
                    "models/phoenix_bird/scene.gltf",
                    AssetScale::Uniform(0.01),
                    [0.0, 0.0, 0.0],
                ),
                AssetDescriptor::new("Box", "models/box/Box.gltf", AssetScale::Uniform(1.0), [0.0, 0.5, 0.0]),
                AssetDescriptor::new(
                    "Box Animated",
                    "models/box_animated/BoxAnimated.gltf",
                    AssetScale::PerAxis([1.0, 1.0, 1.0]),
                    [0.0, 0.0, 0.0],
                )
                .with_clip("animation_AnimatedCube"),
            ],
        }
    }

    /// Reads a JSON array of descriptors
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read catalog file: {:?}", path))?;
        Self::from_json_str(&text).context(format!("Invalid catalog file: {:?}", path))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let entries: Vec<AssetDescriptor> = serde_json::from_str(text)?;
        Self::new(entries)
    }

    pub fn get(&self, id: &str) -> Option<&AssetDescriptor> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
