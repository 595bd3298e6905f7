//! Loading image bytes for uploads and wardrobe garments.

use crate::paths::FitroomPaths;
use fitroom_core::error::{FitroomError, Result};
use fitroom_core::garment::{GarmentSource, Wardrobe};
use fitroom_core::media::ImageData;
use std::path::Path;

/// Reads a user photo from disk, rejecting non-image files.
pub async fn load_photo(path: &Path) -> Result<ImageData> {
    let bytes = tokio::fs::read(path).await?;
    ImageData::from_bytes(bytes, &path.display().to_string())
}

/// Resolves a garment's image bytes from its source (local file or HTTP).
pub async fn fetch_garment_image(client: &reqwest::Client, source: &GarmentSource) -> Result<ImageData> {
    match source {
        GarmentSource::File { path } => load_photo(path).await,
        GarmentSource::Url { url } => {
            log::debug!("fetching garment image from {url}");
            let response = client.get(url).send().await.map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    FitroomError::network(err.to_string())
                } else {
                    FitroomError::remote(err.status().map(|s| s.as_u16()), err.to_string())
                }
            })?;
            if !response.status().is_success() {
                return Err(FitroomError::remote(
                    Some(response.status().as_u16()),
                    format!("could not download garment image from {url}"),
                ));
            }
            let bytes = response.bytes().await.map_err(FitroomError::from)?;
            ImageData::from_bytes(bytes.to_vec(), url)
        }
    }
}

/// Loads the wardrobe: built-ins plus the user's `wardrobe.toml` when it
/// exists.
pub async fn load_wardrobe(paths: &FitroomPaths) -> Result<Wardrobe> {
    let path = paths
        .wardrobe_file()
        .map_err(|e| FitroomError::config(e.to_string()))?;
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => {
            let wardrobe = Wardrobe::builtin_with_extension(&text)?;
            log::info!(
                "loaded wardrobe extension from {} ({} garments total)",
                path.display(),
                wardrobe.garments().len()
            );
            Ok(wardrobe)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Wardrobe::builtin()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_photo_sniffs_type() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();

        let image = load_photo(file.path()).await.unwrap();
        assert_eq!(image.mime, "image/jpeg");
    }

    #[tokio::test]
    async fn test_load_photo_rejects_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not an image").unwrap();

        let err = load_photo(file.path()).await.unwrap_err();
        assert!(err.is_unsupported_media());
    }

    #[tokio::test]
    async fn test_missing_wardrobe_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let paths = FitroomPaths::new(Some(dir.path().to_path_buf()));

        let wardrobe = load_wardrobe(&paths).await.unwrap();
        assert!(!wardrobe.garments().is_empty());
    }

    #[tokio::test]
    async fn test_wardrobe_extension_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let paths = FitroomPaths::new(Some(dir.path().to_path_buf()));
        std::fs::write(
            paths.wardrobe_file().unwrap(),
            r#"
                [[garment]]
                id = "wool-coat"
                name = "Wool Coat"
                url = "https://example.com/coat.png"
            "#,
        )
        .unwrap();

        let wardrobe = load_wardrobe(&paths).await.unwrap();
        assert!(wardrobe.find("wool-coat").is_some());
    }
}
