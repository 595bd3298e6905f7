//! Outfit layers: cumulative snapshots of the styled model.
//!
//! Layer 0 of a session is always the bare generated model (`garment =
//! None`); every later layer is the image after one more garment has been
//! applied. Each layer caches one image per pose so revisiting a pose never
//! costs a network call.

use crate::garment::Garment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry in the outfit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitLayer {
    /// The garment this layer added, or `None` for the base model layer.
    pub garment: Option<Garment>,
    /// Pose name -> image data-URL for this layer.
    pub pose_images: HashMap<String, String>,
}

impl OutfitLayer {
    /// Creates the base model layer, seeded with one pose image.
    pub fn base(pose_name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            garment: None,
            pose_images: HashMap::from([(pose_name.into(), image_url.into())]),
        }
    }

    /// Creates a garment layer seeded with the pose it was generated in.
    pub fn with_garment(
        garment: Garment,
        pose_name: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            garment: Some(garment),
            pose_images: HashMap::from([(pose_name.into(), image_url.into())]),
        }
    }

    pub fn is_base(&self) -> bool {
        self.garment.is_none()
    }

    /// Returns the cached image for a pose, if any.
    pub fn pose_image(&self, pose_name: &str) -> Option<&str> {
        self.pose_images.get(pose_name).map(String::as_str)
    }

    /// Caches an image under a pose name.
    pub fn cache_pose_image(&mut self, pose_name: impl Into<String>, image_url: impl Into<String>) {
        self.pose_images.insert(pose_name.into(), image_url.into());
    }

    /// Any cached image, used as a generation base when the current pose has
    /// not been rendered for this layer yet.
    pub fn any_image(&self) -> Option<&str> {
        self.pose_images.values().next().map(String::as_str)
    }

    /// Display name for stack rendering.
    pub fn display_name(&self) -> &str {
        match &self.garment {
            Some(garment) => &garment.name,
            None => "Base Model",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garment::Garment;

    #[test]
    fn test_base_layer() {
        let layer = OutfitLayer::base("front", "data:image/png;base64,AAAA");
        assert!(layer.is_base());
        assert_eq!(layer.display_name(), "Base Model");
        assert_eq!(layer.pose_image("front"), Some("data:image/png;base64,AAAA"));
        assert_eq!(layer.pose_image("side"), None);
    }

    #[test]
    fn test_garment_layer_caching() {
        let garment = Garment::from_url("tee", "Gemini Tee", "https://example.com/tee.png");
        let mut layer = OutfitLayer::with_garment(garment, "front", "url-front");
        assert!(!layer.is_base());
        assert_eq!(layer.display_name(), "Gemini Tee");

        layer.cache_pose_image("side", "url-side");
        assert_eq!(layer.pose_images.len(), 2);
        assert_eq!(layer.pose_image("side"), Some("url-side"));
    }
}
