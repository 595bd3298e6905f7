//! Garment catalog: the built-in wardrobe plus user extensions.
//!
//! Garments are immutable references to clothing images. The built-in list
//! mirrors the fixed wardrobe of the original design; users can extend it
//! with a `wardrobe.toml` file in the data directory.

use crate::error::{FitroomError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a garment image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GarmentSource {
    /// Remote image fetched over HTTP.
    Url { url: String },
    /// Local image file.
    File { path: PathBuf },
}

/// A selectable clothing item. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garment {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub source: GarmentSource,
}

impl Garment {
    pub fn from_url(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: GarmentSource::Url { url: url.into() },
        }
    }

    pub fn from_file(id: impl Into<String>, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: GarmentSource::File { path: path.into() },
        }
    }
}

/// TOML root for the optional user wardrobe file.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct WardrobeFile {
    #[serde(rename = "garment", default)]
    pub garments: Vec<Garment>,
}

/// The built-in wardrobe shown before any user extension is loaded.
pub static DEFAULT_WARDROBE: Lazy<Vec<Garment>> = Lazy::new(|| {
    vec![
        Garment::from_url(
            "gemini-sweat",
            "Gemini Sweat",
            "https://raw.githubusercontent.com/ammaarreshi/app-images/main/gemini-sweat-2.png",
        ),
        Garment::from_url(
            "gemini-tee",
            "Gemini Tee",
            "https://raw.githubusercontent.com/ammaarreshi/app-images/main/Gemini-tee.png",
        ),
    ]
});

/// A wardrobe: the fixed garments the user can pick from.
#[derive(Debug, Clone, Default)]
pub struct Wardrobe {
    garments: Vec<Garment>,
}

impl Wardrobe {
    /// Builds the wardrobe from the built-in list.
    pub fn builtin() -> Self {
        Self {
            garments: DEFAULT_WARDROBE.clone(),
        }
    }

    /// Parses a `wardrobe.toml` document and appends its garments to the
    /// built-in list. Duplicate ids are rejected.
    pub fn builtin_with_extension(toml_text: &str) -> Result<Self> {
        let mut wardrobe = Self::builtin();
        let file: WardrobeFile = toml::from_str(toml_text)?;
        for garment in file.garments {
            if garment.id.trim().is_empty() || garment.name.trim().is_empty() {
                return Err(FitroomError::config(
                    "wardrobe entries need a non-empty id and name",
                ));
            }
            if wardrobe.find(&garment.id).is_some() {
                return Err(FitroomError::config(format!(
                    "duplicate garment id '{}' in wardrobe file",
                    garment.id
                )));
            }
            wardrobe.garments.push(garment);
        }
        Ok(wardrobe)
    }

    pub fn garments(&self) -> &[Garment] {
        &self.garments
    }

    /// Looks up a garment by id (case-insensitive).
    pub fn find(&self, id: &str) -> Option<&Garment> {
        self.garments.iter().find(|g| g.id.eq_ignore_ascii_case(id))
    }
}
