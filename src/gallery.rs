//! Preset style reference images.

use crate::error::{FuseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One selectable style reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreset {
    /// Short identifier used on the command line.
    pub name: String,
    /// Human readable label.
    pub label: String,
    /// Where the reference image is fetched from.
    pub url: String,
}

impl StylePreset {
    fn new(name: &str, label: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

/// The fixed, ordered set of presets offered in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    presets: Vec<StylePreset>,
}

impl Gallery {
    /// Builds a gallery, rejecting empty lists and duplicate names.
    pub fn new(presets: Vec<StylePreset>) -> Result<Self> {
        if presets.is_empty() {
            return Err(FuseError::InvalidRequest("gallery has no presets".into()));
        }
        let mut seen = HashSet::new();
        for preset in &presets {
            if !seen.insert(preset.name.as_str()) {
                return Err(FuseError::InvalidRequest(format!(
                    "duplicate preset name '{}'",
                    preset.name
                )));
            }
        }
        Ok(Self { presets })
    }

    /// Public-domain paintings hosted on Wikimedia Commons.
    pub fn builtin() -> Self {
        Self {
            presets: vec![
                StylePreset::new(
                    "starry-night",
                    "The Starry Night (van Gogh)",
                    "https://upload.wikimedia.org/wikipedia/commons/thumb/e/ea/Van_Gogh_-_Starry_Night_-_Google_Art_Project.jpg/1280px-Van_Gogh_-_Starry_Night_-_Google_Art_Project.jpg",
                ),
                StylePreset::new(
                    "great-wave",
                    "The Great Wave off Kanagawa (Hokusai)",
                    "https://upload.wikimedia.org/wikipedia/commons/0/0a/The_Great_Wave_off_Kanagawa.jpg",
                ),
                StylePreset::new(
                    "impression-sunrise",
                    "Impression, Sunrise (Monet)",
                    "https://upload.wikimedia.org/wikipedia/commons/5/59/Monet_-_Impression%2C_Sunrise.jpg",
                ),
                StylePreset::new(
                    "the-scream",
                    "The Scream (Munch)",
                    "https://upload.wikimedia.org/wikipedia/commons/c/c5/Edvard_Munch%2C_1893%2C_The_Scream%2C_oil%2C_tempera_and_pastel_on_cardboard%2C_91_x_73_cm%2C_National_Gallery_of_Norway.jpg",
                ),
            ],
        }
    }

    /// Parses a JSON array of presets.
    pub fn from_json(json: &str) -> Result<Self> {
        let presets: Vec<StylePreset> = serde_json::from_str(json)?;
        Self::new(presets)
    }

    /// Loads a gallery from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Preset at `index`.
    pub fn get(&self, index: usize) -> Option<&StylePreset> {
        self.presets.get(index)
    }

    /// Index of the preset called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.presets.iter().position(|p| p.name == name)
    }

    /// Iterates presets in display order.
    pub fn iter(&self) -> impl Iterator<Item = &StylePreset> {
        self.presets.iter()
    }

    /// Number of presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Always false for a constructed gallery.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::builtin()
    }
}
